//! Processing engines
//!
//! An engine owns the knowledge base of a run, preprocesses sources and
//! drives the extraction itself. Two variants exist: a single-process engine
//! that works sequentially on the calling thread and a multi-process engine
//! that distributes entries over a pool of workers.

mod extraction;
mod factory;
mod monitor;
mod multi_process;
mod profiling;
mod single_process;
mod sink;
pub mod transport;

pub use factory::EngineFactory;
pub use multi_process::MultiProcessEngine;
pub use profiling::Profiler;
pub use single_process::SingleProcessEngine;

use crate::core::{ExtractionError, Result};
use crate::domain::entities::{
    FindSpecSet, KnowledgeBase, PathSpec, ProcessingStatus, StatusCallback,
};
use crate::domain::repositories::{
    ExtractionContext, Extractor, Preprocessor, SourceCollector, StorageWriter,
};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

pub const DEFAULT_PROFILING_SAMPLE_RATE: u32 = 1000;

/// Scheduling model of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    SingleProcess,
    MultiProcess,
}

/// What the profiler records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfilingCategory {
    All,
    /// Resident memory of the process
    Memory,
    /// Time consumed by individual parsers
    Parsers,
    /// Time consumed per processed entry
    Processing,
    /// Time consumed writing to storage
    Serializers,
}

impl ProfilingCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ProfilingCategory::All => "all",
            ProfilingCategory::Memory => "memory",
            ProfilingCategory::Parsers => "parsers",
            ProfilingCategory::Processing => "processing",
            ProfilingCategory::Serializers => "serializers",
        }
    }

    /// Returns whether profiling in this category records `other`
    pub fn includes(&self, other: ProfilingCategory) -> bool {
        *self == ProfilingCategory::All || *self == other
    }
}

impl fmt::Display for ProfilingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProfilingCategory {
    type Err = ExtractionError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "all" => Ok(ProfilingCategory::All),
            "memory" => Ok(ProfilingCategory::Memory),
            "parsers" => Ok(ProfilingCategory::Parsers),
            "processing" => Ok(ProfilingCategory::Processing),
            "serializers" => Ok(ProfilingCategory::Serializers),
            other => Err(ExtractionError::InvalidConfiguration(format!(
                "unsupported profiling type: {other}"
            ))),
        }
    }
}

/// Profiling settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilingConfig {
    pub enabled: bool,
    pub directory: Option<PathBuf>,
    /// Number of processed sources between samples
    pub sample_rate: u32,
    pub category: ProfilingCategory,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: None,
            sample_rate: DEFAULT_PROFILING_SAMPLE_RATE,
            category: ProfilingCategory::All,
        }
    }
}

/// Settings copied into every engine a factory builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub debug_output: bool,
    pub profiling: ProfilingConfig,
    /// Multi-process only: distribute work over the message queue transport
    pub use_message_queue: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug_output: false,
            profiling: ProfilingConfig::default(),
            use_message_queue: true,
        }
    }
}

/// Signal shared with a running engine to request an abort
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Collaborators an engine delegates to
#[derive(Clone)]
pub struct EngineServices {
    pub preprocessor: Arc<dyn Preprocessor>,
    pub collector: Arc<dyn SourceCollector>,
    pub extractors: Vec<Arc<dyn Extractor>>,
}

impl EngineServices {
    /// Returns the extractors whose name is in `parser_names`
    pub fn enabled_extractors(&self, parser_names: &[String]) -> Vec<Arc<dyn Extractor>> {
        self.extractors
            .iter()
            .filter(|extractor| parser_names.iter().any(|name| name == extractor.name()))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for EngineServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.extractors.iter().map(|e| e.name()).collect();
        f.debug_struct("EngineServices")
            .field("extractors", &names)
            .finish_non_exhaustive()
    }
}

/// Everything the orchestrator resolved for one run
#[derive(Debug, Clone, Default)]
pub struct ProcessingRequest {
    pub session_identifier: Uuid,
    pub source_path_specs: Vec<PathSpec>,
    pub filter_find_specs: Option<FindSpecSet>,
    pub parser_filter_expression: Option<String>,
    pub parser_names: Vec<String>,
    pub hasher_names_string: Option<String>,
    pub hasher_names: Vec<String>,
    pub mount_path: Option<PathBuf>,
    pub text_prepend: Option<String>,
    /// Number of workers, 0 selects automatically
    pub number_of_workers: usize,
    pub preferred_year: Option<i32>,
    pub process_archive_files: bool,
    pub temporary_directory: Option<PathBuf>,
    pub status_update_callback: Option<StatusCallback>,
    pub enable_crash_handler: bool,
    pub show_memory_usage: bool,
}

impl ProcessingRequest {
    /// Builds the context handed to every extractor
    pub fn extraction_context(&self, knowledge_base: &KnowledgeBase) -> ExtractionContext {
        ExtractionContext {
            parser_filter_expression: self.parser_filter_expression.clone(),
            hasher_names: self.hasher_names.clone(),
            preferred_year: self.preferred_year,
            process_archive_files: self.process_archive_files,
            temporary_directory: self.temporary_directory.clone(),
            text_prepend: self.text_prepend.clone(),
            mount_path: self.mount_path.clone(),
            timezone: knowledge_base.timezone(),
        }
    }
}

/// An engine of either scheduling model
#[derive(Debug)]
pub enum Engine {
    SingleProcess(SingleProcessEngine),
    MultiProcess(MultiProcessEngine),
}

impl Engine {
    pub fn mode(&self) -> EngineMode {
        match self {
            Engine::SingleProcess(_) => EngineMode::SingleProcess,
            Engine::MultiProcess(_) => EngineMode::MultiProcess,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        match self {
            Engine::SingleProcess(engine) => engine.config(),
            Engine::MultiProcess(engine) => engine.config(),
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        match self {
            Engine::SingleProcess(engine) => engine.knowledge_base(),
            Engine::MultiProcess(engine) => engine.knowledge_base(),
        }
    }

    pub fn knowledge_base_mut(&mut self) -> &mut KnowledgeBase {
        match self {
            Engine::SingleProcess(engine) => engine.knowledge_base_mut(),
            Engine::MultiProcess(engine) => engine.knowledge_base_mut(),
        }
    }

    /// Runs the preprocessor, populating the knowledge base
    pub fn preprocess_sources(&mut self, source_path_specs: &[PathSpec]) -> io::Result<()> {
        match self {
            Engine::SingleProcess(engine) => engine.preprocess_sources(source_path_specs),
            Engine::MultiProcess(engine) => engine.preprocess_sources(source_path_specs),
        }
    }

    /// Extracts from the sources; blocks until the run completes or aborts
    pub fn process_sources(
        &mut self,
        request: ProcessingRequest,
        storage_writer: Box<dyn StorageWriter>,
        abort: &AbortFlag,
    ) -> Result<ProcessingStatus> {
        match self {
            Engine::SingleProcess(engine) => engine.process_sources(request, storage_writer, abort),
            Engine::MultiProcess(engine) => engine.process_sources(request, storage_writer, abort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiling_category_from_str() {
        assert_eq!(
            "Parsers".parse::<ProfilingCategory>().unwrap(),
            ProfilingCategory::Parsers
        );
        assert!(matches!(
            "cpu".parse::<ProfilingCategory>(),
            Err(ExtractionError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_all_category_includes_everything() {
        assert!(ProfilingCategory::All.includes(ProfilingCategory::Memory));
        assert!(!ProfilingCategory::Parsers.includes(ProfilingCategory::Memory));
    }

    #[test]
    fn test_abort_flag_is_shared_between_clones() {
        let flag = AbortFlag::new();
        let clone = flag.clone();
        clone.abort();
        assert!(flag.is_aborted());
        flag.reset();
        assert!(!clone.is_aborted());
    }
}
