//! Output writers for the megafauna simulation.
//!
//! Consumes the aggregated [`megafauna_data::Datapoint`] records produced
//! by the engine and writes them to disk. Currently the only format is
//! tab-separated text tables.

pub mod error;
pub mod text_tables;

pub use error::{OutputError, Result};
pub use text_tables::TextTableWriter;

use megafauna_core::output::OutputWriter;
use megafauna_core::parameters::{OutputFormat, Parameters};

/// Construct the output writer selected in the parameters.
///
/// The HFT names define the table columns and must be stable over the
/// whole run.
pub fn create_output_writer(
    params: &Parameters,
    hft_names: Vec<String>,
) -> Result<Box<dyn OutputWriter>> {
    match params.output_format {
        OutputFormat::TextTables => Ok(Box::new(TextTableWriter::new(
            &params.output_text_tables,
            params.output_interval,
            hft_names,
        )?)),
    }
}
