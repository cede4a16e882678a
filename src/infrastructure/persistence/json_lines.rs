//! JSON lines storage writer
//!
//! Appends one JSON object per line to the storage file. Every object
//! carries a `record_type` of `session_start`, `event`, `error` or
//! `session_completion`.

use crate::domain::entities::{EventRecord, ExtractionWarning, ProcessingStatus, RunSession};
use crate::domain::repositories::{StorageError, StorageWriter, StorageWriterFactory};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
enum StorageRecord<'a> {
    SessionStart { session: &'a RunSession },
    Event { event: &'a EventRecord },
    Error { error: &'a ExtractionWarning },
    SessionCompletion {
        session_identifier: uuid::Uuid,
        status: &'a ProcessingStatus,
    },
}

/// Storage writer producing a JSON lines file
pub struct JsonLinesStorageWriter {
    session: RunSession,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    records_written: u64,
}

impl JsonLinesStorageWriter {
    pub fn new(session: RunSession, path: &Path) -> Self {
        Self {
            session,
            path: path.to_path_buf(),
            writer: None,
            records_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    fn write_record(&mut self, record: &StorageRecord<'_>) -> Result<(), StorageError> {
        let writer = self.writer.as_mut().ok_or(StorageError::NotOpen)?;
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }
}

impl StorageWriter for JsonLinesStorageWriter {
    fn open(&mut self) -> Result<(), StorageError> {
        if self.writer.is_some() {
            return Err(StorageError::AlreadyOpen);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                if e.kind() == ErrorKind::PermissionDenied {
                    StorageError::PermissionDenied(self.path.display().to_string())
                } else {
                    StorageError::IoError(e)
                }
            })?;

        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        let mut writer = self.writer.take().ok_or(StorageError::NotOpen)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        tracing::debug!(
            "Closed storage file {} after {} records",
            self.path.display(),
            self.records_written
        );
        Ok(())
    }

    fn session(&self) -> &RunSession {
        &self.session
    }

    fn write_session_start(&mut self) -> Result<(), StorageError> {
        let session = self.session.clone();
        self.write_record(&StorageRecord::SessionStart { session: &session })
    }

    fn add_event(&mut self, event: &EventRecord) -> Result<(), StorageError> {
        self.write_record(&StorageRecord::Event { event })
    }

    fn add_error(&mut self, warning: &ExtractionWarning) -> Result<(), StorageError> {
        self.write_record(&StorageRecord::Error { error: warning })
    }

    fn write_session_completion(
        &mut self,
        status: &ProcessingStatus,
    ) -> Result<(), StorageError> {
        let session_identifier = self.session.identifier();
        self.write_record(&StorageRecord::SessionCompletion {
            session_identifier,
            status,
        })
    }
}

/// Creates JSON lines storage writers
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesStorageFactory;

impl JsonLinesStorageFactory {
    pub fn new() -> Self {
        Self
    }
}

impl StorageWriterFactory for JsonLinesStorageFactory {
    fn create(
        &self,
        session: RunSession,
        path: &Path,
    ) -> Result<Box<dyn StorageWriter>, StorageError> {
        Ok(Box::new(JsonLinesStorageWriter::new(session, path)))
    }
}
