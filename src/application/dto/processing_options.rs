//! Processing options DTO

use crate::core::{ExtractionError, Result};
use crate::domain::entities::StatusCallback;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Options for one extraction run
///
/// Can be loaded from a TOML file; the status callback is only settable in
/// code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProcessingOptions {
    /// Command line the run was started with, recorded for auditing
    pub command_line_arguments: Option<String>,
    /// Catch parser crashes inside workers instead of unwinding
    pub enable_crash_handler: bool,
    /// File with find specifications restricting the entries considered
    pub filter_file: Option<PathBuf>,
    /// Preprocess even when the source type does not require it
    pub force_preprocessing: bool,
    /// Comma separated hasher names, `all` for every hasher
    pub hasher_names_string: Option<String>,
    /// Number of extraction workers, 0 selects automatically
    pub number_of_workers: usize,
    /// Parser filter expression; derived from the source when unset
    pub parser_filter_expression: Option<String>,
    pub preferred_encoding: String,
    pub preferred_year: Option<i32>,
    /// Scan archive files for entries
    pub process_archive_files: bool,
    pub single_process_mode: bool,
    #[serde(skip)]
    pub status_update_callback: Option<StatusCallback>,
    pub temporary_directory: Option<PathBuf>,
    /// Time zone used when the source does not reveal one
    pub timezone: String,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            command_line_arguments: None,
            enable_crash_handler: false,
            filter_file: None,
            force_preprocessing: false,
            hasher_names_string: None,
            number_of_workers: 0,
            parser_filter_expression: None,
            preferred_encoding: "utf-8".to_string(),
            preferred_year: None,
            process_archive_files: false,
            single_process_mode: false,
            status_update_callback: None,
            temporary_directory: None,
            timezone: "UTC".to_string(),
        }
    }
}

impl ProcessingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a TOML file; missing keys keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExtractionError::InvalidConfiguration(format!(
                "Failed to read config file at {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            ExtractionError::InvalidConfiguration(format!(
                "Failed to parse TOML from config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn with_parser_filter_expression(mut self, expression: &str) -> Self {
        self.parser_filter_expression = Some(expression.to_string());
        self
    }

    pub fn with_hashers(mut self, hasher_names: &str) -> Self {
        self.hasher_names_string = Some(hasher_names.to_string());
        self
    }

    pub fn with_filter_file(mut self, filter_file: impl Into<PathBuf>) -> Self {
        self.filter_file = Some(filter_file.into());
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    pub fn with_workers(mut self, number_of_workers: usize) -> Self {
        self.number_of_workers = number_of_workers;
        self
    }

    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.status_update_callback = Some(callback);
        self
    }

    /// Forces preprocessing regardless of the source type
    pub fn forced_preprocessing(mut self) -> Self {
        self.force_preprocessing = true;
        self
    }

    /// Runs in single-process mode
    pub fn single_process(mut self) -> Self {
        self.single_process_mode = true;
        self
    }
}
