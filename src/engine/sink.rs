//! Result sink
//!
//! Receives per-entry results, writes them to storage and keeps the
//! processing status current. Owned by the thread that called the engine.

use super::extraction::EntryResult;
use super::monitor;
use super::profiling::Profiler;
use crate::core::{ExtractionError, Result};
use crate::domain::entities::{ProcessingState, ProcessingStatus, StatusCallback};
use crate::domain::repositories::{StorageError, StorageWriter};
use std::time::Instant;

pub(crate) struct ResultSink {
    storage_writer: Box<dyn StorageWriter>,
    status: ProcessingStatus,
    profiler: Option<Profiler>,
    callback: Option<StatusCallback>,
    debug_output: bool,
}

impl ResultSink {
    /// Opens the storage writer and records the session start
    pub fn open(
        mut storage_writer: Box<dyn StorageWriter>,
        status: ProcessingStatus,
        profiler: Option<Profiler>,
        callback: Option<StatusCallback>,
        debug_output: bool,
    ) -> Result<Self> {
        storage_writer.open()?;
        storage_writer.write_session_start()?;

        Ok(Self {
            storage_writer,
            status,
            profiler,
            callback,
            debug_output,
        })
    }

    pub fn status(&self) -> &ProcessingStatus {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut ProcessingStatus {
        &mut self.status
    }

    /// Stores the result of one entry processed by `worker`
    pub fn record(&mut self, worker: usize, result: EntryResult) -> std::result::Result<(), StorageError> {
        let write_start = Instant::now();
        for event in &result.events {
            self.storage_writer.add_event(event)?;
        }
        for warning in &result.warnings {
            if self.debug_output {
                tracing::warn!(
                    "{} failed on {}: {}",
                    warning.parser.as_deref().unwrap_or("extraction"),
                    warning.path_spec,
                    warning.message
                );
            }
            self.storage_writer.add_error(warning)?;
        }
        let write_elapsed = write_start.elapsed();

        let events = result.events.len() as u64;
        let errors = result.warnings.len() as u64;
        self.status.sources_processed += 1;
        self.status.events += events;
        self.status.errors += errors;

        let worker_status = self.status.worker_mut(worker);
        worker_status.sources_processed += 1;
        worker_status.events_produced += events;
        worker_status.errors += errors;
        worker_status.crashed |= result.crashed;

        if let Some(profiler) = self.profiler.as_mut() {
            for (parser, elapsed) in &result.parser_timings {
                profiler.record_parser(parser, *elapsed);
            }
            profiler.record_processing(result.elapsed);
            profiler.record_serializer(write_elapsed);
            if let Err(e) = profiler.entry_processed() {
                tracing::warn!("Unable to write profiling sample: {}", e);
            }
        }

        self.notify();
        Ok(())
    }

    /// Invokes the status callback with the current status
    pub fn notify(&self) {
        if let Some(callback) = &self.callback {
            callback.call(&self.status);
        }
    }

    pub fn log_worker_status(&mut self) {
        monitor::log_worker_status(&mut self.status);
    }

    /// Completes the session
    ///
    /// An aborted run still records its completion and is then reported as
    /// `UserAbort` carrying the partial status.
    pub fn finish(mut self, aborted: bool) -> Result<ProcessingStatus> {
        let state = if aborted {
            ProcessingState::Aborted
        } else {
            ProcessingState::Completed
        };
        self.status.finish(state);

        if let Some(profiler) = self.profiler.take() {
            if let Err(e) = profiler.finish() {
                tracing::warn!("Unable to finish profiling: {}", e);
            }
        }

        self.storage_writer.write_session_completion(&self.status)?;
        self.storage_writer.close()?;
        self.notify();

        if aborted {
            tracing::warn!("Processing aborted");
            return Err(ExtractionError::UserAbort {
                status: Box::new(self.status),
            });
        }

        tracing::info!(
            "Processing completed: {} sources, {} events, {} errors",
            self.status.sources_processed,
            self.status.events,
            self.status.errors
        );
        Ok(self.status)
    }

    /// Closes storage after a failure without recording completion
    pub fn discard(mut self) {
        if let Err(e) = self.storage_writer.close() {
            tracing::warn!("Unable to close storage: {}", e);
        }
    }
}
