//! File stat extractor
//!
//! Produces one event per file system timestamp of an entry. Enabled hashers
//! add their digests as event attributes.

use crate::domain::entities::{EventRecord, PathSpec};
use crate::domain::repositories::{ExtractionContext, Extractor, ExtractorError};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;

pub const PARSER_NAME: &str = "filestat";

const DATA_TYPE: &str = "fs:stat";
const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct FileStatExtractor;

impl FileStatExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// Digests of an entry's content
#[derive(Debug, Default)]
struct Digests {
    md5: Option<String>,
    sha256: Option<String>,
}

fn compute_digests(path: &Path, context: &ExtractionContext) -> io::Result<Digests> {
    let want_md5 = context.hasher_enabled("md5");
    let want_sha256 = context.hasher_enabled("sha256");
    if !want_md5 && !want_sha256 {
        return Ok(Digests::default());
    }

    let mut file = File::open(path)?;
    let mut md5_context = md5::Context::new();
    let mut sha256 = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        if want_md5 {
            md5_context.consume(&buffer[..read]);
        }
        if want_sha256 {
            sha256.update(&buffer[..read]);
        }
    }

    Ok(Digests {
        md5: want_md5.then(|| format!("{:x}", md5_context.compute())),
        sha256: want_sha256.then(|| hex::encode(sha256.finalize())),
    })
}

fn timestamps(metadata: &Metadata) -> Vec<(&'static str, SystemTime)> {
    [
        ("Content Modification Time", metadata.modified()),
        ("Last Access Time", metadata.accessed()),
        ("Creation Time", metadata.created()),
    ]
    .into_iter()
    .filter_map(|(description, time)| time.ok().map(|time| (description, time)))
    .collect()
}

impl Extractor for FileStatExtractor {
    fn name(&self) -> &str {
        PARSER_NAME
    }

    fn extract(
        &self,
        path_spec: &PathSpec,
        context: &ExtractionContext,
    ) -> Result<Vec<EventRecord>, ExtractorError> {
        let path = path_spec.location();
        let metadata = fs::symlink_metadata(path)?;

        let digests = if metadata.is_file() {
            compute_digests(path, context)?
        } else {
            Digests::default()
        };

        let display_name = context.display_name(path_spec);
        let events = timestamps(&metadata)
            .into_iter()
            .map(|(description, time)| {
                let mut event = EventRecord::new(
                    DateTime::<Utc>::from(time),
                    description,
                    DATA_TYPE,
                    PARSER_NAME,
                    display_name.clone(),
                )
                .with_attribute("size", metadata.len())
                .with_attribute("is_directory", metadata.is_dir());

                if let Some(md5) = &digests.md5 {
                    event = event.with_attribute("md5_hash", md5.as_str());
                }
                if let Some(sha256) = &digests.sha256 {
                    event = event.with_attribute("sha256_hash", sha256.as_str());
                }
                event
            })
            .collect();

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_produces_modification_event() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, b"hello").unwrap();

        let events = FileStatExtractor::new()
            .extract(&PathSpec::os(&path), &ExtractionContext::default())
            .unwrap();

        let modification = events
            .iter()
            .find(|event| event.timestamp_description == "Content Modification Time")
            .unwrap();
        assert_eq!(modification.parser, "filestat");
        assert_eq!(modification.attributes["size"], 5);
        assert!(!modification.attributes.contains_key("md5_hash"));
    }

    #[test]
    fn test_enabled_hashers_add_digests() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, b"hello").unwrap();

        let context = ExtractionContext {
            hasher_names: vec!["md5".to_string(), "sha256".to_string()],
            ..Default::default()
        };
        let events = FileStatExtractor::new()
            .extract(&PathSpec::os(&path), &context)
            .unwrap();

        assert!(!events.is_empty());
        assert_eq!(
            events[0].attributes["md5_hash"],
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert_eq!(
            events[0].attributes["sha256_hash"],
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_missing_entry_is_an_error() {
        let dir = tempdir().unwrap();
        let result = FileStatExtractor::new().extract(
            &PathSpec::os(dir.path().join("gone")),
            &ExtractionContext::default(),
        );
        assert!(matches!(result, Err(ExtractorError::Io(_))));
    }
}
