//! File system collector
//!
//! Expands a source into its file entries with `walkdir`. Symbolic links are
//! not followed.

use crate::domain::entities::{FindSpecSet, PathSpec, PathSpecKind};
use crate::domain::repositories::{CollectorError, SourceCollector};
use std::fs;
use std::io;
use walkdir::WalkDir;

/// Collector for files and directories on a mounted file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemCollector {
    max_depth: Option<usize>,
}

impl FileSystemCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how deep directory sources are traversed
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

impl SourceCollector for FileSystemCollector {
    fn collect(
        &self,
        source_path_spec: &PathSpec,
        find_specs: Option<&FindSpecSet>,
        visit: &mut dyn FnMut(PathSpec) -> bool,
    ) -> Result<(), CollectorError> {
        if source_path_spec.kind() == PathSpecKind::StorageMediaDevice {
            return Err(CollectorError::Unsupported(format!(
                "storage media devices are not supported: {}",
                source_path_spec
            )));
        }

        let root = source_path_spec.location();
        let metadata = fs::metadata(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CollectorError::NotFound(root.display().to_string()),
            _ => CollectorError::IoError(e),
        })?;

        if metadata.is_file() {
            visit(PathSpec::os(root));
            return Ok(());
        }

        let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if let Some(max_depth) = self.max_depth {
            walker = walker.max_depth(max_depth);
        }

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Unable to read entry in {}: {}", root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(find_specs) = find_specs {
                let Ok(relative) = entry.path().strip_prefix(root) else {
                    continue;
                };
                if !find_specs.matches(relative) {
                    continue;
                }
            }

            if !visit(PathSpec::os(entry.path())) {
                break;
            }
        }

        Ok(())
    }
}
