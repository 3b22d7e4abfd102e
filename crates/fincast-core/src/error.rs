//! Error types for Fincast

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient input: {0}")]
    InsufficientInput(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Prediction source invalid: {0}")]
    PredictionSourceInvalid(String),

    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller may retry once more data is available
    pub fn is_insufficient_input(&self) -> bool {
        matches!(self, Error::InsufficientInput(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
