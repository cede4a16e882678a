//! Storage target validation
//!
//! Checks that the output destination is usable before any work starts.
//! Whether an existing file really is a storage container is left to the
//! storage writer.

use crate::core::{ExtractionError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A storage target that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTarget {
    path: PathBuf,
    append: bool,
}

impl StorageTarget {
    /// Validates a storage target path
    ///
    /// Fails with `InvalidConfiguration` if the path exists and is not a
    /// regular file, or if its directory is not writable. An existing
    /// regular file is accepted and the run appends to it.
    pub fn validate(path: &Path) -> Result<Self> {
        let append = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => {
                tracing::warn!("Appending to an already existing storage file.");
                true
            }
            Ok(_) => {
                return Err(ExtractionError::InvalidConfiguration(format!(
                    "Storage file: {} already exists and is not a file.",
                    path.display()
                )));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                return Err(ExtractionError::InvalidConfiguration(format!(
                    "Unable to access storage file: {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        if !is_writable(directory) {
            return Err(ExtractionError::InvalidConfiguration(format!(
                "Unable to write to storage file: {}",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            append,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the target already existed and will be appended to
    pub fn is_append(&self) -> bool {
        self.append
    }
}

#[cfg(unix)]
fn is_writable(directory: &Path) -> bool {
    rustix::fs::access(directory, rustix::fs::Access::WRITE_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable(directory: &Path) -> bool {
    fs::metadata(directory)
        .map(|metadata| metadata.is_dir() && !metadata.permissions().readonly())
        .unwrap_or(false)
}
