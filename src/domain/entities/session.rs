//! Run session entity
//!
//! Immutable record describing one extraction run. Stored alongside the
//! extraction results by the storage writer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Record of what a run was asked to do and what it will use
#[derive(Debug, Clone, Serialize)]
pub struct RunSession {
    identifier: Uuid,
    start_time: DateTime<Utc>,
    command_line_arguments: Option<String>,
    enabled_parser_names: Vec<String>,
    filter_expression: Option<String>,
    filter_file: Option<PathBuf>,
    debug_mode: bool,
    parser_filter_expression: Option<String>,
    preferred_encoding: String,
    preferred_year: Option<i32>,
}

impl Default for RunSession {
    fn default() -> Self {
        Self {
            identifier: Uuid::new_v4(),
            start_time: Utc::now(),
            command_line_arguments: None,
            enabled_parser_names: Vec::new(),
            filter_expression: None,
            filter_file: None,
            debug_mode: false,
            parser_filter_expression: None,
            preferred_encoding: "utf-8".to_string(),
            preferred_year: None,
        }
    }
}

impl RunSession {
    /// Creates an empty session with a fresh identifier
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_command_line_arguments(mut self, arguments: Option<String>) -> Self {
        self.command_line_arguments = arguments;
        self
    }

    pub(crate) fn with_enabled_parser_names(mut self, names: Vec<String>) -> Self {
        self.enabled_parser_names = names;
        self
    }

    pub(crate) fn with_filter_expression(mut self, expression: Option<String>) -> Self {
        self.filter_expression = expression;
        self
    }

    pub(crate) fn with_filter_file(mut self, filter_file: Option<PathBuf>) -> Self {
        self.filter_file = filter_file;
        self
    }

    pub(crate) fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub(crate) fn with_parser_filter_expression(mut self, expression: Option<String>) -> Self {
        self.parser_filter_expression = expression;
        self
    }

    pub(crate) fn with_preferred_encoding(mut self, encoding: String) -> Self {
        self.preferred_encoding = encoding;
        self
    }

    pub(crate) fn with_preferred_year(mut self, year: Option<i32>) -> Self {
        self.preferred_year = year;
        self
    }

    /// Returns the unique run identifier
    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn command_line_arguments(&self) -> Option<&str> {
        self.command_line_arguments.as_deref()
    }

    /// Returns the parser and plugin names enabled for this run
    pub fn enabled_parser_names(&self) -> &[String] {
        &self.enabled_parser_names
    }

    pub fn filter_expression(&self) -> Option<&str> {
        self.filter_expression.as_deref()
    }

    pub fn filter_file(&self) -> Option<&Path> {
        self.filter_file.as_deref()
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Returns the parser filter expression the run actually uses
    pub fn parser_filter_expression(&self) -> Option<&str> {
        self.parser_filter_expression.as_deref()
    }

    pub fn preferred_encoding(&self) -> &str {
        &self.preferred_encoding
    }

    pub fn preferred_year(&self) -> Option<i32> {
        self.preferred_year
    }
}
