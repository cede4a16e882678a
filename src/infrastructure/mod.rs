//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories: the built-in parser
//! registry, file system access and storage writers.

pub mod collectors;
pub mod extractors;
pub mod persistence;
pub mod preprocessors;
pub mod registry;
mod source_scanner;

pub use source_scanner::{STORAGE_MEDIA_IMAGE_EXTENSIONS, scan_source};

use crate::engine::EngineServices;
use std::sync::Arc;

/// Engine collaborators for sources on a mounted file system
pub fn default_engine_services() -> EngineServices {
    EngineServices {
        preprocessor: Arc::new(preprocessors::FileSystemPreprocessor::new()),
        collector: Arc::new(collectors::FileSystemCollector::new()),
        extractors: vec![Arc::new(extractors::FileStatExtractor::new())],
    }
}
