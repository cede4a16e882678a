//! Multi-process engine
//!
//! A producer expands the sources into a task queue, a pool of workers
//! extracts from the queued entries and the calling thread collects the
//! results, writing them to storage. The calling thread blocks until every
//! worker is done or the run is aborted.

use super::extraction::{EntryResult, extract_entry};
use super::profiling::Profiler;
use super::sink::ResultSink;
use super::transport::{PopResult, PushError, TaskQueue, create_queue};
use super::{AbortFlag, EngineConfig, EngineServices, ProcessingRequest};
use crate::core::{ExtractionError, Result};
use crate::domain::entities::{KnowledgeBase, PathSpec, ProcessingStatus};
use crate::domain::repositories::{ExtractionContext, Extractor, StorageError, StorageWriter};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const TASK_QUEUE_CAPACITY: usize = 1000;
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const MONITOR_INTERVAL: Duration = Duration::from_secs(5);

/// Messages sent from workers to the collector
enum WorkerMessage {
    Entry { worker: usize, result: EntryResult },
    Done { worker: usize },
}

/// Reports a worker as done even when it unwinds
struct DoneGuard {
    worker: usize,
    results: Arc<dyn TaskQueue<WorkerMessage>>,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        let mut message = WorkerMessage::Done {
            worker: self.worker,
        };
        loop {
            match self.results.push(message, POLL_INTERVAL) {
                Ok(()) | Err(PushError::Closed(_)) => break,
                Err(PushError::Timeout(back)) => message = back,
            }
        }
    }
}

/// Returns the number of workers to start
///
/// Zero selects one worker per CPU, keeping one CPU for the collector.
pub fn resolve_worker_count(requested: usize) -> usize {
    if requested > 0 {
        requested
    } else {
        num_cpus::get().saturating_sub(1).max(1)
    }
}

#[derive(Debug)]
pub struct MultiProcessEngine {
    config: EngineConfig,
    use_message_queue: bool,
    knowledge_base: KnowledgeBase,
    services: EngineServices,
}

impl MultiProcessEngine {
    pub fn new(config: EngineConfig, services: EngineServices) -> Self {
        Self {
            use_message_queue: config.use_message_queue,
            config,
            knowledge_base: KnowledgeBase::new(),
            services,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns whether work is distributed over the message queue transport
    pub fn uses_message_queue(&self) -> bool {
        self.use_message_queue
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn knowledge_base_mut(&mut self) -> &mut KnowledgeBase {
        &mut self.knowledge_base
    }

    pub fn preprocess_sources(&mut self, source_path_specs: &[PathSpec]) -> io::Result<()> {
        self.services
            .preprocessor
            .preprocess(source_path_specs, &mut self.knowledge_base)
    }

    pub fn process_sources(
        &mut self,
        request: ProcessingRequest,
        storage_writer: Box<dyn StorageWriter>,
        abort: &AbortFlag,
    ) -> Result<ProcessingStatus> {
        let number_of_workers = resolve_worker_count(request.number_of_workers);
        let context = Arc::new(request.extraction_context(&self.knowledge_base));
        let extractors = Arc::new(self.services.enabled_extractors(&request.parser_names));
        let profiler = Profiler::new(&self.config.profiling, "multi_process")?;

        tracing::debug!(
            "Starting {} workers using the {} transport",
            number_of_workers,
            if self.use_message_queue {
                "message queue"
            } else {
                "local queue"
            }
        );

        let tasks: Arc<dyn TaskQueue<PathSpec>> =
            create_queue(self.use_message_queue, Some(TASK_QUEUE_CAPACITY));
        let results: Arc<dyn TaskQueue<WorkerMessage>> =
            create_queue(self.use_message_queue, None);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(number_of_workers + 1)
            .thread_name(|index| format!("loupe-worker-{index}"))
            .build()
            .map_err(io::Error::other)?;

        let mut sink = ResultSink::open(
            storage_writer,
            ProcessingStatus::new(request.session_identifier),
            profiler,
            request.status_update_callback.clone(),
            self.config.debug_output,
        )?;
        for worker in 0..number_of_workers {
            sink.status_mut().worker_mut(worker);
        }

        let stop = AbortFlag::new();
        let collected = Arc::new(AtomicU64::new(0));
        let scan_error: Arc<Mutex<Option<ExtractionError>>> = Arc::new(Mutex::new(None));
        let mut storage_error: Option<StorageError> = None;

        pool.in_place_scope(|scope| {
            {
                let tasks = Arc::clone(&tasks);
                let collector = Arc::clone(&self.services.collector);
                let sources = request.source_path_specs.clone();
                let find_specs = request.filter_find_specs.clone();
                let collected = Arc::clone(&collected);
                let scan_error = Arc::clone(&scan_error);
                let abort = abort.clone();
                let stop = stop.clone();

                scope.spawn(move |_| {
                    let stopping = || abort.is_aborted() || stop.is_aborted();

                    for source in &sources {
                        if stopping() {
                            break;
                        }
                        let result = collector.collect(source, find_specs.as_ref(), &mut |entry| {
                            let mut entry = entry;
                            loop {
                                if stopping() {
                                    return false;
                                }
                                match tasks.push(entry, POLL_INTERVAL) {
                                    Ok(()) => {
                                        collected.fetch_add(1, Ordering::Relaxed);
                                        return true;
                                    }
                                    Err(PushError::Timeout(back)) => entry = back,
                                    Err(PushError::Closed(_)) => return false,
                                }
                            }
                        });

                        if let Err(e) = result {
                            *scan_error.lock() = Some(ExtractionError::SourceScan(format!(
                                "{}: {}",
                                source, e
                            )));
                            stop.abort();
                            break;
                        }
                    }
                    tasks.close();
                });
            }

            for worker in 0..number_of_workers {
                let tasks = Arc::clone(&tasks);
                let results = Arc::clone(&results);
                let extractors = Arc::clone(&extractors);
                let context = Arc::clone(&context);
                let abort = abort.clone();
                let stop = stop.clone();
                let catch_panics = request.enable_crash_handler;

                scope.spawn(move |_| {
                    run_worker(
                        worker,
                        tasks,
                        results,
                        &extractors,
                        &context,
                        catch_panics,
                        || abort.is_aborted() || stop.is_aborted(),
                    );
                });
            }

            let mut workers_done = 0;
            let mut last_monitor = Instant::now();

            while workers_done < number_of_workers {
                match results.pop(POLL_INTERVAL) {
                    PopResult::Item(WorkerMessage::Entry { worker, result }) => {
                        if storage_error.is_some() {
                            continue;
                        }
                        sink.status_mut().sources_collected = collected.load(Ordering::Relaxed);
                        if let Err(e) = sink.record(worker, result) {
                            storage_error = Some(e);
                            stop.abort();
                        }
                    }
                    PopResult::Item(WorkerMessage::Done { worker }) => {
                        tracing::debug!("Worker {} done", worker);
                        workers_done += 1;
                    }
                    PopResult::Timeout => {
                        sink.status_mut().sources_collected = collected.load(Ordering::Relaxed);
                        sink.notify();
                    }
                    PopResult::Closed => break,
                }

                if request.show_memory_usage && last_monitor.elapsed() >= MONITOR_INTERVAL {
                    sink.log_worker_status();
                    last_monitor = Instant::now();
                }
            }

            stop.abort();
            results.close();
        });

        sink.status_mut().sources_collected = collected.load(Ordering::Relaxed);
        if request.show_memory_usage {
            sink.log_worker_status();
        }

        if let Some(e) = storage_error {
            sink.discard();
            return Err(e.into());
        }
        if let Some(e) = scan_error.lock().take() {
            sink.discard();
            return Err(e);
        }

        sink.finish(abort.is_aborted())
    }
}

fn run_worker(
    worker: usize,
    tasks: Arc<dyn TaskQueue<PathSpec>>,
    results: Arc<dyn TaskQueue<WorkerMessage>>,
    extractors: &[Arc<dyn Extractor>],
    context: &ExtractionContext,
    catch_panics: bool,
    stopping: impl Fn() -> bool,
) {
    let _done = DoneGuard {
        worker,
        results: Arc::clone(&results),
    };

    loop {
        if stopping() {
            break;
        }
        let path_spec = match tasks.pop(POLL_INTERVAL) {
            PopResult::Item(path_spec) => path_spec,
            PopResult::Timeout => continue,
            PopResult::Closed => break,
        };

        let result = extract_entry(extractors, &path_spec, context, catch_panics);
        let mut message = WorkerMessage::Entry { worker, result };
        loop {
            match results.push(message, POLL_INTERVAL) {
                Ok(()) => break,
                Err(PushError::Timeout(back)) => message = back,
                Err(PushError::Closed(_)) => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_worker_count_is_kept() {
        assert_eq!(resolve_worker_count(3), 3);
    }

    #[test]
    fn test_automatic_worker_count_is_at_least_one() {
        assert!(resolve_worker_count(0) >= 1);
    }
}
