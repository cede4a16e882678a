//! Processing status entity
//!
//! Summary of a run as reported by the engine. The orchestrator returns it
//! unchanged.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// State of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    Running,
    Completed,
    Aborted,
}

/// Counters for one extraction worker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStatus {
    pub identifier: usize,
    pub sources_processed: u64,
    pub events_produced: u64,
    pub errors: u64,
    /// Set when the worker panicked and the crash handler caught it
    pub crashed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resident_memory: Option<u64>,
}

impl WorkerStatus {
    pub fn new(identifier: usize) -> Self {
        Self {
            identifier,
            ..Default::default()
        }
    }
}

/// Summary of an extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingStatus {
    session_identifier: Uuid,
    state: ProcessingState,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    pub sources_collected: u64,
    pub sources_processed: u64,
    pub events: u64,
    pub errors: u64,
    pub workers: Vec<WorkerStatus>,
}

impl ProcessingStatus {
    /// Creates a running status for the given session
    pub fn new(session_identifier: Uuid) -> Self {
        Self {
            session_identifier,
            state: ProcessingState::Running,
            start_time: Utc::now(),
            end_time: None,
            sources_collected: 0,
            sources_processed: 0,
            events: 0,
            errors: 0,
            workers: Vec::new(),
        }
    }

    pub fn session_identifier(&self) -> Uuid {
        self.session_identifier
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Marks the run as finished in the given state
    pub fn finish(&mut self, state: ProcessingState) {
        self.state = state;
        self.end_time = Some(Utc::now());
    }

    pub fn is_aborted(&self) -> bool {
        self.state == ProcessingState::Aborted
    }

    /// Returns the status of a worker, creating it on first use
    pub fn worker_mut(&mut self, identifier: usize) -> &mut WorkerStatus {
        match self.workers.iter().position(|w| w.identifier == identifier) {
            Some(index) => &mut self.workers[index],
            None => {
                self.workers.push(WorkerStatus::new(identifier));
                let last = self.workers.len() - 1;
                &mut self.workers[last]
            }
        }
    }
}

/// Callback invoked with status updates while a run is in progress
#[derive(Clone)]
pub struct StatusCallback(Arc<dyn Fn(&ProcessingStatus) + Send + Sync>);

impl StatusCallback {
    pub fn new(callback: impl Fn(&ProcessingStatus) + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    pub fn call(&self, status: &ProcessingStatus) {
        (self.0)(status)
    }
}

impl fmt::Debug for StatusCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StatusCallback")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_mut_creates_once() {
        let mut status = ProcessingStatus::new(Uuid::new_v4());
        status.worker_mut(2).events_produced += 3;
        status.worker_mut(2).events_produced += 1;
        assert_eq!(status.workers.len(), 1);
        assert_eq!(status.workers[0].events_produced, 4);
    }

    #[test]
    fn test_finish_sets_end_time() {
        let mut status = ProcessingStatus::new(Uuid::new_v4());
        assert_eq!(status.state(), ProcessingState::Running);
        status.finish(ProcessingState::Aborted);
        assert!(status.is_aborted());
        assert!(status.end_time().is_some());
    }
}
