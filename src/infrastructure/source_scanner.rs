//! Source type detection
//!
//! Decides what kind of source a path on the local system is.

use crate::domain::entities::{PathSpec, PathSpecKind, SourceType};
use std::fs;
use std::io;
use std::path::Path;

/// File extensions treated as storage media images
pub const STORAGE_MEDIA_IMAGE_EXTENSIONS: [&str; 5] = ["raw", "dd", "img", "e01", "vmdk"];

/// Returns the path specification and source type of `path`
pub fn scan_source(path: &Path) -> io::Result<(PathSpec, SourceType)> {
    let metadata = fs::metadata(path)?;
    let file_type = metadata.file_type();

    if file_type.is_dir() {
        return Ok((PathSpec::os(path), SourceType::Directory));
    }

    if file_type.is_file() {
        let is_image = path
            .extension()
            .map(|extension| extension.to_string_lossy().to_lowercase())
            .is_some_and(|extension| STORAGE_MEDIA_IMAGE_EXTENSIONS.contains(&extension.as_str()));

        return Ok(if is_image {
            (
                PathSpec::new(PathSpecKind::StorageMediaImage, path),
                SourceType::StorageMediaImage,
            )
        } else {
            (PathSpec::os(path), SourceType::File)
        });
    }

    if is_block_device(&metadata) {
        return Ok((
            PathSpec::new(PathSpecKind::StorageMediaDevice, path),
            SourceType::StorageMediaDevice,
        ));
    }

    Ok((PathSpec::os(path), SourceType::Other))
}

#[cfg(unix)]
fn is_block_device(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;
    metadata.file_type().is_block_device()
}

#[cfg(not(unix))]
fn is_block_device(_metadata: &fs::Metadata) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directory_source() {
        let dir = tempdir().unwrap();
        let (_, source_type) = scan_source(dir.path()).unwrap();
        assert_eq!(source_type, SourceType::Directory);
    }

    #[test]
    fn test_image_extensions() {
        let dir = tempdir().unwrap();
        for name in ["disk.raw", "disk.DD", "evidence.E01", "vm.vmdk"] {
            let path = dir.path().join(name);
            fs::write(&path, b"\0").unwrap();
            let (path_spec, source_type) = scan_source(&path).unwrap();
            assert_eq!(source_type, SourceType::StorageMediaImage, "{name}");
            assert_eq!(path_spec.kind(), PathSpecKind::StorageMediaImage);
        }
    }

    #[test]
    fn test_plain_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("NTUSER.DAT");
        fs::write(&path, b"regf").unwrap();
        assert_eq!(scan_source(&path).unwrap().1, SourceType::File);
    }

    #[test]
    fn test_missing_source() {
        let dir = tempdir().unwrap();
        assert!(scan_source(&dir.path().join("gone")).is_err());
    }
}
