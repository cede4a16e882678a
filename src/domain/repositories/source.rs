//! Source access traits
//!
//! Interfaces to the virtual source layer: inspecting a source before
//! extraction and enumerating its file entries.

use crate::domain::entities::{FindSpecSet, KnowledgeBase, PathSpec};
use std::io;
use thiserror::Error;

/// Errors raised while enumerating a source
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Unsupported source: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Discovers environment facts about a source
pub trait Preprocessor: Send + Sync {
    /// Inspects the sources and records what it finds in the knowledge base
    ///
    /// I/O errors are returned to the caller, which decides whether the run
    /// may continue.
    fn preprocess(
        &self,
        source_path_specs: &[PathSpec],
        knowledge_base: &mut KnowledgeBase,
    ) -> io::Result<()>;
}

/// Expands source path specifications into file entries
pub trait SourceCollector: Send + Sync {
    /// Calls `visit` for every file entry of the source
    ///
    /// `visit` returns false to stop the enumeration early. Entries not
    /// matched by `find_specs` are skipped.
    fn collect(
        &self,
        source_path_spec: &PathSpec,
        find_specs: Option<&FindSpecSet>,
        visit: &mut dyn FnMut(PathSpec) -> bool,
    ) -> Result<(), CollectorError>;
}
