//! Extraction frontend
//!
//! The single entry point of a run. `process_sources` validates the storage
//! target, builds an engine, preprocesses the sources when their type calls
//! for it, resolves the parser filter, hashers and time zone from what
//! preprocessing found, builds the run session and hands everything to the
//! engine.

use crate::application::dto::ProcessingOptions;
use crate::application::preprocessing::PreprocessingCoordinator;
use crate::application::run_state::{RunState, RunTracker};
use crate::application::session_builder::{SessionArgs, SessionBuilder};
use crate::application::storage_target::StorageTarget;
use crate::core::{ExtractionError, Outcome, Result};
use crate::domain::entities::{KnowledgeBase, PathSpec, ProcessingStatus, SourceType};
use crate::domain::repositories::{
    ComponentInfo, ParserRegistry, RegistryError, StorageWriterFactory,
};
use crate::domain::services::{build_find_specs_from_file, resolve_parser_filter_preset};
use crate::engine::{
    AbortFlag, EngineConfig, EngineFactory, EngineMode, EngineServices, ProcessingRequest,
    ProfilingCategory, ProfilingConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Time zone used when neither the source nor the caller provides one
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Orchestrates extraction runs
///
/// Settings changed through the setters apply to the next call of
/// `process_sources`.
pub struct ExtractionFrontend {
    registry: Arc<dyn ParserRegistry>,
    storage_factory: Arc<dyn StorageWriterFactory>,
    engine_factory: EngineFactory,
    engine_config: EngineConfig,
    show_memory_information: bool,
    storage_file_path: Option<PathBuf>,
    text_prepend: Option<String>,
    mount_path: Option<PathBuf>,
    filter_expression: Option<String>,
    abort: AbortFlag,
    last_run: RunTracker,
}

impl ExtractionFrontend {
    pub fn new(
        registry: Arc<dyn ParserRegistry>,
        storage_factory: Arc<dyn StorageWriterFactory>,
        services: EngineServices,
    ) -> Self {
        Self {
            registry,
            storage_factory,
            engine_factory: EngineFactory::new(services),
            engine_config: EngineConfig::default(),
            show_memory_information: false,
            storage_file_path: None,
            text_prepend: None,
            mount_path: None,
            filter_expression: None,
            abort: AbortFlag::new(),
            last_run: RunTracker::new(),
        }
    }

    /// Enables profiling for the engines built from now on
    pub fn enable_profiling(
        &mut self,
        directory: impl Into<PathBuf>,
        sample_rate: u32,
        category: ProfilingCategory,
    ) {
        self.engine_config.profiling = ProfilingConfig {
            enabled: true,
            directory: Some(directory.into()),
            sample_rate,
            category,
        };
    }

    pub fn disable_profiling(&mut self) {
        self.engine_config.profiling.enabled = false;
    }

    pub fn set_debug_mode(&mut self, enable_debug: bool) {
        self.engine_config.debug_output = enable_debug;
    }

    pub fn set_show_memory_information(&mut self, show_memory: bool) {
        self.show_memory_information = show_memory;
    }

    pub fn set_storage_file(&mut self, storage_file_path: impl Into<PathBuf>) {
        self.storage_file_path = Some(storage_file_path.into());
    }

    /// Sets the text prepended to every event display name
    pub fn set_text_prepend(&mut self, text_prepend: &str) {
        self.text_prepend = Some(text_prepend.to_string());
    }

    /// Sets the mount point stripped from event display names
    pub fn set_mount_path(&mut self, mount_path: impl Into<PathBuf>) {
        self.mount_path = Some(mount_path.into());
    }

    /// Sets the event filter expression recorded in the run session
    pub fn set_filter_expression(&mut self, filter_expression: &str) {
        self.filter_expression = Some(filter_expression.to_string());
    }

    /// Selects the multi-process transport: message queue or local queue
    pub fn set_use_message_queue(&mut self, use_message_queue: bool) {
        self.engine_config.use_message_queue = use_message_queue;
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine_config
    }

    /// Returns a handle that aborts the running extraction
    ///
    /// The flag is cleared when the next run starts.
    pub fn abort_flag(&self) -> AbortFlag {
        self.abort.clone()
    }

    /// States the last call of `process_sources` moved through
    pub fn last_run_states(&self) -> &[RunState] {
        self.last_run.history()
    }

    pub fn hashers_information(&self) -> Vec<ComponentInfo> {
        self.registry.hashers_information()
    }

    pub fn parsers_information(&self) -> Vec<ComponentInfo> {
        self.registry.parsers_information()
    }

    pub fn parser_plugins_information(
        &self,
        parser_filter_expression: Option<&str>,
    ) -> std::result::Result<Vec<ComponentInfo>, RegistryError> {
        self.registry.parser_plugins_information(parser_filter_expression)
    }

    pub fn parser_presets_information(&self) -> Vec<ComponentInfo> {
        self.registry.parser_presets_information()
    }

    pub fn names_of_parsers_with_plugins(&self) -> Vec<String> {
        self.registry.names_of_parsers_with_plugins()
    }

    /// Processes the sources
    ///
    /// Blocks until the engine completes or is aborted. Configuration errors
    /// are returned before an engine touches the sources; a failed
    /// preprocessing or an unsupported time zone only degrades the run.
    pub fn process_sources(
        &mut self,
        source_path_specs: &[PathSpec],
        source_type: SourceType,
        options: ProcessingOptions,
    ) -> Result<ProcessingStatus> {
        self.last_run = RunTracker::new();
        self.abort.reset();

        let storage_file_path = self.storage_file_path.clone().ok_or_else(|| {
            ExtractionError::InvalidConfiguration("Missing storage file path.".to_string())
        })?;
        let target = StorageTarget::validate(&storage_file_path)?;
        self.last_run.advance(RunState::Validated);

        let mode = if source_type == SourceType::File || options.single_process_mode {
            EngineMode::SingleProcess
        } else {
            EngineMode::MultiProcess
        };
        if source_type == SourceType::File && !options.single_process_mode {
            tracing::debug!("Source is a single file, running in single process mode.");
        }
        let mut engine = self.engine_factory.build(mode, &self.engine_config);
        self.last_run.advance(RunState::EngineReady);

        if PreprocessingCoordinator::is_required(source_type, options.force_preprocessing) {
            match PreprocessingCoordinator::run(&mut engine, source_path_specs) {
                Outcome::Ok(()) => {}
                Outcome::Recoverable(reason) => {
                    tracing::error!("Unable to preprocess with error: {}", reason);
                }
                Outcome::Fatal(e) => return Err(e),
            }
            self.last_run.advance(RunState::Preprocessed);
        } else {
            self.last_run.advance(RunState::SkippedPreprocessing);
        }

        let parser_filter_expression = resolve_parser_filter_expression(
            options.parser_filter_expression.as_deref(),
            engine.knowledge_base(),
        );
        self.last_run.advance(RunState::PresetResolved);

        let parser_names = self
            .registry
            .list_parser_names(parser_filter_expression.as_deref())
            .unwrap_or_else(|e| {
                tracing::warn!("Unable to list parser names: {}", e);
                Vec::new()
            });
        let hasher_names = self
            .registry
            .list_hasher_names(options.hasher_names_string.as_deref());

        resolve_timezone(engine.knowledge_base_mut(), &options.timezone);

        let filter_find_specs = options
            .filter_file
            .as_deref()
            .map(|filter_file| {
                build_find_specs_from_file(filter_file, engine.knowledge_base().path_attributes())
            })
            .transpose()?;

        let session = SessionBuilder::new(Arc::clone(&self.registry)).build(SessionArgs {
            command_line_arguments: options.command_line_arguments.clone(),
            filter_expression: self.filter_expression.clone(),
            filter_file: options.filter_file.clone(),
            debug_mode: self.engine_config.debug_output,
            parser_filter_expression: parser_filter_expression.clone(),
            preferred_encoding: options.preferred_encoding.clone(),
            preferred_year: options.preferred_year,
        })?;
        self.last_run.advance(RunState::SessionBuilt);

        let session_identifier = session.identifier();
        let storage_writer = self.storage_factory.create(session, target.path())?;

        let request = ProcessingRequest {
            session_identifier,
            source_path_specs: source_path_specs.to_vec(),
            filter_find_specs,
            parser_filter_expression,
            parser_names,
            hasher_names_string: options.hasher_names_string,
            hasher_names,
            mount_path: self.mount_path.clone(),
            text_prepend: self.text_prepend.clone(),
            number_of_workers: options.number_of_workers,
            preferred_year: options.preferred_year,
            process_archive_files: options.process_archive_files,
            temporary_directory: options.temporary_directory,
            status_update_callback: options.status_update_callback,
            enable_crash_handler: options.enable_crash_handler,
            show_memory_usage: self.show_memory_information,
        };

        self.last_run.advance(RunState::Dispatched);
        let status = engine.process_sources(request, storage_writer, &self.abort)?;
        self.last_run.advance(RunState::Completed);

        Ok(status)
    }

    pub fn storage_file_path(&self) -> Option<&Path> {
        self.storage_file_path.as_deref()
    }
}

/// Returns the parser filter expression a run applies
///
/// A caller supplied expression always wins; otherwise the preset matching
/// the knowledge base, if any.
fn resolve_parser_filter_expression(
    requested: Option<&str>,
    knowledge_base: &KnowledgeBase,
) -> Option<String> {
    if let Some(expression) = requested.filter(|expression| !expression.trim().is_empty()) {
        return Some(expression.to_string());
    }

    let preset =
        resolve_parser_filter_preset(knowledge_base.os_guess(), knowledge_base.os_version())?;
    tracing::info!("Parser filter expression changed to: {}", preset);
    Some(preset.name().to_string())
}

fn apply_timezone(knowledge_base: &mut KnowledgeBase, timezone: &str) -> Outcome {
    match knowledge_base.set_timezone(timezone) {
        Ok(()) => Outcome::Ok(()),
        Err(e) => e.into(),
    }
}

/// Sets the knowledge base time zone
///
/// Candidates are tried in order: the zone found by preprocessing, the
/// caller's zone, then UTC. An unsupported candidate falls through to the
/// next one; if none applies the current zone is kept.
fn resolve_timezone(knowledge_base: &mut KnowledgeBase, requested: &str) {
    let discovered = knowledge_base.timezone_name().map(str::to_string);
    let candidates = discovered
        .iter()
        .map(String::as_str)
        .chain([requested, DEFAULT_TIMEZONE])
        .filter(|name| !name.trim().is_empty());

    for name in candidates {
        match apply_timezone(knowledge_base, name) {
            Outcome::Ok(()) => {
                tracing::debug!("Time zone set to: {}", name);
                return;
            }
            Outcome::Recoverable(reason) => {
                tracing::warn!("Unable to set timezone: {} with error: {}", name, reason);
            }
            Outcome::Fatal(e) => {
                tracing::error!("Unable to set timezone: {} with error: {}", name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OperatingSystem;
    use chrono_tz::Tz;

    #[test]
    fn test_requested_expression_wins_over_preset() {
        let mut knowledge_base = KnowledgeBase::new();
        knowledge_base.set_os_version("Windows XP Professional");

        assert_eq!(
            resolve_parser_filter_expression(Some("filestat"), &knowledge_base).as_deref(),
            Some("filestat")
        );
        assert_eq!(
            resolve_parser_filter_expression(None, &knowledge_base).as_deref(),
            Some("winxp")
        );
    }

    #[test]
    fn test_blank_expression_counts_as_missing() {
        let mut knowledge_base = KnowledgeBase::new();
        knowledge_base.set_os_guess(OperatingSystem::Linux);

        assert_eq!(
            resolve_parser_filter_expression(Some("  "), &knowledge_base).as_deref(),
            Some("linux")
        );
    }

    #[test]
    fn test_no_facts_no_expression() {
        assert!(resolve_parser_filter_expression(None, &KnowledgeBase::new()).is_none());
    }

    #[test]
    fn test_discovered_timezone_wins() {
        let mut knowledge_base = KnowledgeBase::new();
        knowledge_base.set_timezone_name("Europe/Amsterdam");

        resolve_timezone(&mut knowledge_base, "America/New_York");
        assert_eq!(knowledge_base.timezone(), Tz::Europe__Amsterdam);
    }

    #[test]
    fn test_unsupported_discovered_timezone_falls_through() {
        let mut knowledge_base = KnowledgeBase::new();
        knowledge_base.set_timezone_name("Mars/Olympus_Mons");

        resolve_timezone(&mut knowledge_base, "America/New_York");
        assert_eq!(knowledge_base.timezone(), Tz::America__New_York);
    }

    #[test]
    fn test_unsupported_requested_timezone_falls_back_to_utc() {
        let mut knowledge_base = KnowledgeBase::new();
        knowledge_base.set_timezone("Asia/Tokyo").unwrap();

        resolve_timezone(&mut knowledge_base, "Nowhere/Special");
        assert_eq!(knowledge_base.timezone(), Tz::UTC);
    }
}
