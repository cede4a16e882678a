//! Worker resource monitoring

use crate::domain::entities::ProcessingStatus;

/// Returns the resident memory of the current process in bytes
#[cfg(target_os = "linux")]
pub(crate) fn resident_memory() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(resident_pages * rustix::param::page_size() as u64)
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn resident_memory() -> Option<u64> {
    None
}

/// Logs the status of every worker
pub(crate) fn log_worker_status(status: &mut ProcessingStatus) {
    let memory = resident_memory();
    for worker in &mut status.workers {
        worker.resident_memory = memory;
        tracing::info!(
            worker = worker.identifier,
            sources = worker.sources_processed,
            events = worker.events_produced,
            errors = worker.errors,
            crashed = worker.crashed,
            resident_memory = memory,
            "Worker status"
        );
    }
}
