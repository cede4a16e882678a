//! Single-process engine
//!
//! Collects, extracts and stores sequentially on the calling thread.

use super::extraction::extract_entry;
use super::profiling::Profiler;
use super::sink::ResultSink;
use super::{AbortFlag, EngineConfig, EngineServices, ProcessingRequest};
use crate::core::{ExtractionError, Result};
use crate::domain::entities::{KnowledgeBase, PathSpec, ProcessingStatus};
use crate::domain::repositories::{StorageError, StorageWriter};
use std::io;

const WORKER_IDENTIFIER: usize = 0;

#[derive(Debug)]
pub struct SingleProcessEngine {
    config: EngineConfig,
    knowledge_base: KnowledgeBase,
    services: EngineServices,
}

impl SingleProcessEngine {
    pub fn new(config: EngineConfig, services: EngineServices) -> Self {
        Self {
            config,
            knowledge_base: KnowledgeBase::new(),
            services,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
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
        let context = request.extraction_context(&self.knowledge_base);
        let extractors = self.services.enabled_extractors(&request.parser_names);
        let profiler = Profiler::new(&self.config.profiling, "single_process")?;

        tracing::debug!(
            "Processing {} sources with {} extractors",
            request.source_path_specs.len(),
            extractors.len()
        );

        let mut sink = ResultSink::open(
            storage_writer,
            ProcessingStatus::new(request.session_identifier),
            profiler,
            request.status_update_callback.clone(),
            self.config.debug_output,
        )?;

        let mut storage_error: Option<StorageError> = None;

        for source in &request.source_path_specs {
            if abort.is_aborted() {
                break;
            }

            let collected = self.services.collector.collect(
                source,
                request.filter_find_specs.as_ref(),
                &mut |path_spec| {
                    if abort.is_aborted() {
                        return false;
                    }
                    if self.config.debug_output {
                        tracing::debug!("Processing {}", path_spec);
                    }
                    sink.status_mut().sources_collected += 1;

                    let result = extract_entry(
                        &extractors,
                        &path_spec,
                        &context,
                        request.enable_crash_handler,
                    );
                    match sink.record(WORKER_IDENTIFIER, result) {
                        Ok(()) => true,
                        Err(e) => {
                            storage_error = Some(e);
                            false
                        }
                    }
                },
            );

            if let Some(e) = storage_error.take() {
                sink.discard();
                return Err(e.into());
            }
            if let Err(e) = collected {
                sink.discard();
                return Err(ExtractionError::SourceScan(format!("{}: {}", source, e)));
            }
        }

        sink.finish(abort.is_aborted())
    }
}
