//! Preprocessing coordinator
//!
//! Runs the engine's preprocessing for sources that need it. Preprocessing
//! is best effort: an I/O failure is logged and the run continues with
//! whatever knowledge base facts are already present.

use crate::core::{ExtractionError, Outcome};
use crate::domain::entities::{PathSpec, SourceType};
use crate::engine::Engine;

pub struct PreprocessingCoordinator;

impl PreprocessingCoordinator {
    /// Returns whether a run over `source_type` preprocesses its sources
    pub fn is_required(source_type: SourceType, force_preprocessing: bool) -> bool {
        force_preprocessing || source_type.requires_preprocessing()
    }

    /// Preprocesses the sources, absorbing I/O failures
    pub fn run(engine: &mut Engine, source_path_specs: &[PathSpec]) -> Outcome {
        tracing::debug!("Starting preprocessing.");

        match engine.preprocess_sources(source_path_specs) {
            Ok(()) => {
                tracing::debug!("Preprocessing done.");
                Outcome::Ok(())
            }
            Err(e) => ExtractionError::PreprocessingFailure(e).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_and_media_sources_are_preprocessed() {
        assert!(PreprocessingCoordinator::is_required(SourceType::Directory, false));
        assert!(PreprocessingCoordinator::is_required(SourceType::StorageMediaDevice, false));
        assert!(PreprocessingCoordinator::is_required(SourceType::StorageMediaImage, false));
    }

    #[test]
    fn test_file_sources_need_forcing() {
        assert!(!PreprocessingCoordinator::is_required(SourceType::File, false));
        assert!(PreprocessingCoordinator::is_required(SourceType::File, true));
        assert!(!PreprocessingCoordinator::is_required(SourceType::Other, false));
    }
}
