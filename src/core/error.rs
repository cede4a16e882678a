//! Extraction error taxonomy
//!
//! Configuration-time errors abort a run before dispatch, run-time
//! errors from preprocessing and timezone resolution are absorbed by the
//! orchestrator, and errors raised by the dispatched engine surface as-is.

use crate::domain::entities::ProcessingStatus;
use crate::domain::repositories::{RegistryError, StorageError};
use std::io;
use thiserror::Error;

/// Errors produced while preparing or driving an extraction run
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unable to preprocess: {0}")]
    PreprocessingFailure(#[source] io::Error),

    #[error("Unsupported time zone: {0}")]
    UnsupportedTimezone(String),

    #[error("Unable to scan source: {0}")]
    SourceScan(String),

    #[error("Processing aborted by user")]
    UserAbort { status: Box<ProcessingStatus> },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ExtractionError {
    /// Returns true for errors that must stop the run
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ExtractionError::PreprocessingFailure(_) | ExtractionError::UnsupportedTimezone(_)
        )
    }
}

impl From<RegistryError> for ExtractionError {
    fn from(error: RegistryError) -> Self {
        ExtractionError::InvalidConfiguration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result of a step whose failures may be absorbed by the caller
#[derive(Debug)]
pub enum Outcome<T = ()> {
    /// The step succeeded
    Ok(T),
    /// The step failed; the run continues without its effects
    Recoverable(String),
    /// The step failed and the run must stop
    Fatal(ExtractionError),
}

impl<T> Outcome<T> {
    /// Returns true if the step succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    /// Converts into a `Result`, treating recoverable failures as `None`
    pub fn into_result(self) -> Result<Option<T>> {
        match self {
            Outcome::Ok(value) => Ok(Some(value)),
            Outcome::Recoverable(_) => Ok(None),
            Outcome::Fatal(error) => Err(error),
        }
    }
}

impl<T> From<ExtractionError> for Outcome<T> {
    fn from(error: ExtractionError) -> Self {
        if error.is_fatal() {
            Outcome::Fatal(error)
        } else {
            Outcome::Recoverable(error.to_string())
        }
    }
}
