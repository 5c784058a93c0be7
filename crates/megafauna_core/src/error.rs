//! Error types of the simulation engine.
//!
//! Three classes of failure exist: invalid arguments (bad numbers at a
//! call site), logic violations (the calling code broke an ordering or
//! state contract) and configuration errors (rejected once at
//! construction). Nothing is retried; the driver surfaces every error to
//! the host model.

use megafauna_data::{ForageValueError, InvalidDate};
use thiserror::Error;

/// Main error type of the simulation engine.
#[derive(Debug, Error)]
pub enum SimError {
    /// A numeric argument was out of range, NaN or infinite.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was called out of order or on a dead object; this
    /// indicates a bug in the calling code.
    #[error("logic violation: {0}")]
    LogicViolation(String),

    /// A parameter set was rejected at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Writing output failed.
    #[error("output error: {0}")]
    Output(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    ForageValue(#[from] ForageValueError),

    #[error(transparent)]
    Date(#[from] InvalidDate),
}

impl SimError {
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn logic<S: Into<String>>(message: S) -> Self {
        Self::LogicViolation(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    pub fn output<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Output(Box::new(source))
    }
}

/// Result type alias for the simulation engine.
pub type Result<T> = std::result::Result<T, SimError>;
