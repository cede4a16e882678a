//! Storage writer trait
//!
//! Defines the interface for persisting a run's session and results. The
//! on-disk format belongs to the implementation.

use crate::domain::entities::{EventRecord, ExtractionWarning, ProcessingStatus, RunSession};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when writing to storage
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage is not open")]
    NotOpen,

    #[error("Storage is already open")]
    AlreadyOpen,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Writes the session and extraction results of one run
///
/// The writer exclusively owns its target for the duration of a run.
pub trait StorageWriter: Send {
    fn open(&mut self) -> Result<(), StorageError>;

    fn close(&mut self) -> Result<(), StorageError>;

    /// Returns the session the writer is bound to
    fn session(&self) -> &RunSession;

    fn write_session_start(&mut self) -> Result<(), StorageError>;

    fn add_event(&mut self, event: &EventRecord) -> Result<(), StorageError>;

    fn add_error(&mut self, warning: &ExtractionWarning) -> Result<(), StorageError>;

    /// Records the end of the session together with its final status
    fn write_session_completion(&mut self, status: &ProcessingStatus)
    -> Result<(), StorageError>;
}

/// Creates storage writers bound to a session and a target path
pub trait StorageWriterFactory: Send + Sync {
    fn create(
        &self,
        session: RunSession,
        path: &Path,
    ) -> Result<Box<dyn StorageWriter>, StorageError>;
}
