//! Error type of the output writers.

use thiserror::Error;

/// Failures while creating or writing output files.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("file system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("output directory \"{0}\" already contains table files")]
    DirectoryNotEmpty(String),

    #[error("unsupported output option: {0}")]
    Unsupported(String),
}

/// Result type alias for the output writers.
pub type Result<T> = std::result::Result<T, OutputError>;

impl From<OutputError> for megafauna_core::SimError {
    fn from(error: OutputError) -> Self {
        match error {
            OutputError::Unsupported(what) => megafauna_core::SimError::config(what),
            other => megafauna_core::SimError::output(other),
        }
    }
}
