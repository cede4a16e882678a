//! In-memory storage writer
//!
//! Keeps everything a run stores in a shared buffer that stays readable
//! after the writer has been handed to an engine.

use crate::domain::entities::{EventRecord, ExtractionWarning, ProcessingStatus, RunSession};
use crate::domain::repositories::{StorageError, StorageWriter, StorageWriterFactory};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What runs stored so far
#[derive(Debug, Clone, Default)]
pub struct StoredRuns {
    /// Paths writers were created for
    pub targets: Vec<PathBuf>,
    pub sessions: Vec<RunSession>,
    pub events: Vec<EventRecord>,
    pub errors: Vec<ExtractionWarning>,
    pub completions: Vec<ProcessingStatus>,
}

/// Shared handle to the stored runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage(Arc<Mutex<StoredRuns>>);

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of what has been stored
    pub fn snapshot(&self) -> StoredRuns {
        self.0.lock().clone()
    }

    fn with<R>(&self, f: impl FnOnce(&mut StoredRuns) -> R) -> R {
        f(&mut self.0.lock())
    }
}

pub struct MemoryStorageWriter {
    session: RunSession,
    storage: MemoryStorage,
    is_open: bool,
}

impl MemoryStorageWriter {
    pub fn new(session: RunSession, storage: MemoryStorage) -> Self {
        Self {
            session,
            storage,
            is_open: false,
        }
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.is_open {
            Ok(())
        } else {
            Err(StorageError::NotOpen)
        }
    }
}

impl StorageWriter for MemoryStorageWriter {
    fn open(&mut self) -> Result<(), StorageError> {
        if self.is_open {
            return Err(StorageError::AlreadyOpen);
        }
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.is_open = false;
        Ok(())
    }

    fn session(&self) -> &RunSession {
        &self.session
    }

    fn write_session_start(&mut self) -> Result<(), StorageError> {
        self.ensure_open()?;
        let session = self.session.clone();
        self.storage.with(|stored| stored.sessions.push(session));
        Ok(())
    }

    fn add_event(&mut self, event: &EventRecord) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.storage.with(|stored| stored.events.push(event.clone()));
        Ok(())
    }

    fn add_error(&mut self, warning: &ExtractionWarning) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.storage.with(|stored| stored.errors.push(warning.clone()));
        Ok(())
    }

    fn write_session_completion(
        &mut self,
        status: &ProcessingStatus,
    ) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.storage
            .with(|stored| stored.completions.push(status.clone()));
        Ok(())
    }
}

/// Creates writers that share one `MemoryStorage`
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageFactory {
    storage: MemoryStorage,
}

impl MemoryStorageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage(&self) -> MemoryStorage {
        self.storage.clone()
    }
}

impl StorageWriterFactory for MemoryStorageFactory {
    fn create(
        &self,
        session: RunSession,
        path: &Path,
    ) -> Result<Box<dyn StorageWriter>, StorageError> {
        self.storage
            .with(|stored| stored.targets.push(path.to_path_buf()));
        Ok(Box::new(MemoryStorageWriter::new(session, self.storage.clone())))
    }
}
