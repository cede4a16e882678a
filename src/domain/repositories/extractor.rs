//! Extractor trait
//!
//! Defines the interface for the parsers that turn a file entry into
//! events. Parsing artifact content is the implementation's business.

use crate::domain::entities::{EventRecord, PathSpec};
use chrono_tz::Tz;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while extracting from a single entry
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Unable to read entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported entry: {0}")]
    Unsupported(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Settings shared by every extractor during a run
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub parser_filter_expression: Option<String>,
    pub hasher_names: Vec<String>,
    pub preferred_year: Option<i32>,
    pub process_archive_files: bool,
    pub temporary_directory: Option<PathBuf>,
    pub text_prepend: Option<String>,
    pub mount_path: Option<PathBuf>,
    pub timezone: Tz,
}

impl Default for ExtractionContext {
    fn default() -> Self {
        Self {
            parser_filter_expression: None,
            hasher_names: Vec::new(),
            preferred_year: None,
            process_archive_files: false,
            temporary_directory: None,
            text_prepend: None,
            mount_path: None,
            timezone: Tz::UTC,
        }
    }
}

impl ExtractionContext {
    /// Returns the name an entry is reported under
    ///
    /// The mount path is stripped from the location and the text prepend,
    /// if any, is put in front of it.
    pub fn display_name(&self, path_spec: &PathSpec) -> String {
        let location = path_spec.location();
        let relative = self
            .mount_path
            .as_deref()
            .and_then(|mount| location.strip_prefix(mount).ok())
            .map(|stripped| format!("/{}", stripped.display()))
            .unwrap_or_else(|| location.display().to_string());

        match &self.text_prepend {
            Some(prepend) => format!("{prepend}{relative}"),
            None => relative,
        }
    }

    /// Returns whether a hasher is enabled for this run
    pub fn hasher_enabled(&self, name: &str) -> bool {
        self.hasher_names.iter().any(|hasher| hasher == name)
    }
}

/// Turns one file entry into events
pub trait Extractor: Send + Sync {
    /// Parser name the extractor is registered under
    fn name(&self) -> &str;

    fn extract(
        &self,
        path_spec: &PathSpec,
        context: &ExtractionContext,
    ) -> Result<Vec<EventRecord>, ExtractorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_mount_path_and_prepends() {
        let context = ExtractionContext {
            mount_path: Some(PathBuf::from("/mnt/evidence")),
            text_prepend: Some("case-7:".to_string()),
            ..Default::default()
        };
        let spec = PathSpec::os("/mnt/evidence/Users/bob/notes.txt");
        assert_eq!(context.display_name(&spec), "case-7:/Users/bob/notes.txt");
    }

    #[test]
    fn test_display_name_outside_mount_path() {
        let context = ExtractionContext {
            mount_path: Some(PathBuf::from("/mnt/evidence")),
            ..Default::default()
        };
        let spec = PathSpec::os("/tmp/other");
        assert_eq!(context.display_name(&spec), "/tmp/other");
    }
}
