//! Tab-separated text tables, one file per output variable.

use crate::error::{OutputError, Result};
use megafauna_core::output::OutputWriter;
use megafauna_core::parameters::{TextTable, TextTableOptions};
use megafauna_data::{Datapoint, ForageType, HerbivoreData, OutputInterval};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File extension of the table files.
const FILE_EXTENSION: &str = "tsv";

const FIELD_SEPARATOR: char = '\t';

/// Value written where no data exist (e.g. an extinct HFT).
const MISSING_VALUE: &str = "0.0";

struct TableFile {
    table: TextTable,
    writer: BufWriter<File>,
}

/// Writes aggregated datapoints as tab-separated tables into an output
/// directory: one file per selected variable, one row per date interval
/// and aggregation unit, one column per HFT (or per forage type for the
/// habitat tables).
pub struct TextTableWriter {
    files: Vec<TableFile>,
    interval: OutputInterval,
    precision: usize,
    hft_names: Vec<String>,
}

impl TextTableWriter {
    /// Create the output directory and all selected table files, with
    /// caption rows. Existing table files are not overwritten but
    /// reported as an error.
    pub fn new(
        options: &TextTableOptions,
        interval: OutputInterval,
        hft_names: Vec<String>,
    ) -> Result<Self> {
        let directory = PathBuf::from(&options.directory);
        fs::create_dir_all(&directory)?;
        tracing::info!(directory = %directory.display(), "writing output tables");

        let mut files = Vec::with_capacity(options.tables.len());
        for table in &options.tables {
            let path = directory.join(format!("{}.{}", table_name(*table), FILE_EXTENSION));
            if path.exists() {
                return Err(OutputError::DirectoryNotEmpty(
                    directory.display().to_string(),
                ));
            }
            let mut writer = BufWriter::new(File::create(&path)?);
            write_captions(&mut writer, *table, interval, &hft_names)?;
            files.push(TableFile {
                table: *table,
                writer,
            });
        }
        Ok(Self {
            files,
            interval,
            precision: options.precision,
            hft_names,
        })
    }

    /// The directory path for a table file.
    #[must_use]
    pub fn table_path(directory: &Path, table: TextTable) -> PathBuf {
        directory.join(format!("{}.{}", table_name(table), FILE_EXTENSION))
    }

    fn write_row(&mut self, file_index: usize, datapoint: &Datapoint) -> Result<()> {
        let precision = self.precision;
        let table = self.files[file_index].table;
        let mut row = String::new();

        // Time columns refer to the start of the aggregation interval.
        let first = datapoint.interval.first();
        match self.interval {
            OutputInterval::Daily => {
                row.push_str(&format!(
                    "{}{}{}",
                    first.year(),
                    FIELD_SEPARATOR,
                    first.julian_day()
                ));
            }
            OutputInterval::Monthly => {
                row.push_str(&format!(
                    "{}{}{}",
                    first.year(),
                    FIELD_SEPARATOR,
                    first.month()
                ));
            }
            OutputInterval::Annual | OutputInterval::Decadal => {
                row.push_str(&first.year().to_string());
            }
        }
        row.push(FIELD_SEPARATOR);
        row.push_str(&datapoint.aggregation_unit);

        match table {
            TextTable::AvailableForage => {
                let mass = datapoint
                    .data
                    .habitat
                    .available_forage
                    .mass()
                    .unwrap_or_default();
                for ft in ForageType::ALL {
                    row.push(FIELD_SEPARATOR);
                    row.push_str(&format!("{:.*}", precision, mass.get(ft)));
                }
            }
            _ => {
                for hft_name in &self.hft_names {
                    row.push(FIELD_SEPARATOR);
                    match datapoint.data.herbivores.get(hft_name) {
                        Some(data) => {
                            row.push_str(&format!(
                                "{:.*}",
                                precision,
                                herbivore_value(table, data)
                            ));
                        }
                        None => row.push_str(MISSING_VALUE),
                    }
                }
            }
        }

        let writer = &mut self.files[file_index].writer;
        writeln!(writer, "{row}")?;
        writer.flush()?;
        Ok(())
    }
}

impl OutputWriter for TextTableWriter {
    fn write_datapoint(&mut self, datapoint: &Datapoint) -> megafauna_core::Result<()> {
        for file_index in 0..self.files.len() {
            self.write_row(file_index, datapoint)?;
        }
        Ok(())
    }
}

fn table_name(table: TextTable) -> &'static str {
    match table {
        TextTable::AvailableForage => "available_forage",
        TextTable::BodyFat => "body_fat",
        TextTable::EatenForage => "eaten_forage_per_ind",
        TextTable::EatenNitrogen => "eaten_nitrogen",
        TextTable::Expenditure => "expenditure",
        TextTable::IndividualDensity => "individual_density",
        TextTable::MassDensity => "mass_density",
        TextTable::Offspring => "offspring",
    }
}

fn herbivore_value(table: TextTable, data: &HerbivoreData) -> f64 {
    match table {
        TextTable::BodyFat => data.body_fat,
        TextTable::EatenForage => data.eaten_forage_per_ind.sum(),
        TextTable::EatenNitrogen => data.eaten_nitrogen_per_km2,
        TextTable::Expenditure => data.expenditure,
        TextTable::IndividualDensity => data.ind_per_km2,
        TextTable::MassDensity => data.kg_per_km2,
        TextTable::Offspring => data.offspring,
        TextTable::AvailableForage => unreachable!("habitat table"),
    }
}

fn write_captions(
    writer: &mut BufWriter<File>,
    table: TextTable,
    interval: OutputInterval,
    hft_names: &[String],
) -> Result<()> {
    let mut captions = Vec::new();
    match interval {
        OutputInterval::Daily => {
            captions.push("year".to_string());
            captions.push("day".to_string());
        }
        OutputInterval::Monthly => {
            captions.push("year".to_string());
            captions.push("month".to_string());
        }
        OutputInterval::Annual | OutputInterval::Decadal => captions.push("year".to_string()),
    }
    captions.push("agg_unit".to_string());
    match table {
        TextTable::AvailableForage => {
            captions.extend(ForageType::ALL.iter().map(|ft| ft.name().to_string()));
        }
        _ => captions.extend(hft_names.iter().cloned()),
    }
    writeln!(writer, "{}", captions.join(&FIELD_SEPARATOR.to_string()))?;
    Ok(())
}
