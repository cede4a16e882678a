//! File system preprocessor
//!
//! Looks for well-known operating system locations in a mounted or copied
//! file system tree and records what it finds in the knowledge base.

use crate::domain::entities::{KnowledgeBase, OperatingSystem, PathSpec};
use crate::domain::repositories::Preprocessor;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Collects the `<key>`/`<string>` pairs of a property list
fn plist_strings(content: &str) -> io::Result<BTreeMap<String, String>> {
    let pattern = Regex::new(r"<key>([^<]+)</key>\s*<string>([^<]*)</string>")
        .map_err(io::Error::other)?;
    Ok(pattern
        .captures_iter(content)
        .map(|captures| (captures[1].trim().to_string(), captures[2].trim().to_string()))
        .collect())
}

/// Preprocessor for directory sources
///
/// Sources that are not directories are skipped; a source that cannot be
/// accessed at all is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemPreprocessor;

impl FileSystemPreprocessor {
    pub fn new() -> Self {
        Self
    }

    fn preprocess_windows(&self, root: &Path, knowledge_base: &mut KnowledgeBase) -> io::Result<bool> {
        let Some(windows) = find_child(root, "windows")? else {
            return Ok(false);
        };
        if find_child(&windows, "system32")?.is_none() {
            return Ok(false);
        }

        knowledge_base.set_os_guess(OperatingSystem::Windows);
        let system_root = format!("/{}", file_name(&windows));
        knowledge_base.set_path_attribute("systemroot", system_root.clone());
        knowledge_base.set_path_attribute("windir", system_root);

        if let Some(path) = find_child(root, "users")? {
            knowledge_base.set_path_attribute("users", format!("/{}", file_name(&path)));
        } else if let Some(path) = find_child(root, "documents and settings")? {
            knowledge_base.set_path_attribute("users", format!("/{}", file_name(&path)));
            // Profiles moved to "Users" with Vista.
            if knowledge_base.os_version().is_empty() {
                knowledge_base.set_os_version("Windows XP");
            }
        }
        Ok(true)
    }

    fn preprocess_macosx(&self, root: &Path, knowledge_base: &mut KnowledgeBase) -> io::Result<bool> {
        let core_services = root.join("System").join("Library").join("CoreServices");
        if !core_services.is_dir() {
            return Ok(false);
        }

        knowledge_base.set_os_guess(OperatingSystem::MacOsx);
        knowledge_base.set_path_attribute("users", "/Users");

        if let Some(content) = read_optional(&core_services.join("SystemVersion.plist"))? {
            let strings = plist_strings(&content)?;
            match (strings.get("ProductName"), strings.get("ProductVersion")) {
                (Some(name), Some(version)) => {
                    knowledge_base.set_os_version(format!("{name} {version}"))
                }
                (None, Some(version)) => knowledge_base.set_os_version(version.as_str()),
                _ => {}
            }
        }

        if let Ok(target) = fs::read_link(root.join("private").join("etc").join("localtime")) {
            if let Some(name) = zoneinfo_name(&target) {
                knowledge_base.set_timezone_name(name);
            }
        }
        Ok(true)
    }

    fn preprocess_linux(&self, root: &Path, knowledge_base: &mut KnowledgeBase) -> io::Result<bool> {
        let etc = root.join("etc");
        if !etc.is_dir() {
            return Ok(false);
        }

        knowledge_base.set_os_guess(OperatingSystem::Linux);
        knowledge_base.set_path_attribute("users", "/home");

        if let Some(content) = read_optional(&etc.join("os-release"))? {
            if let Some(pretty_name) = os_release_value(&content, "PRETTY_NAME") {
                knowledge_base.set_os_version(pretty_name);
            }
        }
        if let Some(content) = read_optional(&etc.join("hostname"))? {
            let hostname = content.trim();
            if !hostname.is_empty() {
                knowledge_base.set_hostname(hostname);
            }
        }
        if let Some(content) = read_optional(&etc.join("timezone"))? {
            let timezone = content.trim();
            if !timezone.is_empty() {
                knowledge_base.set_timezone_name(timezone);
            }
        } else if let Ok(target) = fs::read_link(etc.join("localtime")) {
            if let Some(name) = zoneinfo_name(&target) {
                knowledge_base.set_timezone_name(name);
            }
        }
        Ok(true)
    }
}

impl Preprocessor for FileSystemPreprocessor {
    fn preprocess(
        &self,
        source_path_specs: &[PathSpec],
        knowledge_base: &mut KnowledgeBase,
    ) -> io::Result<()> {
        for source in source_path_specs {
            let root = source.location();
            if !fs::metadata(root)?.is_dir() {
                tracing::debug!("Not preprocessing {}: not a directory", source);
                continue;
            }

            let detected = self.preprocess_windows(root, knowledge_base)?
                || self.preprocess_macosx(root, knowledge_base)?
                || self.preprocess_linux(root, knowledge_base)?;

            if detected {
                tracing::info!(
                    "Preprocessing detected {} {}",
                    knowledge_base
                        .os_guess()
                        .map(|os| os.name())
                        .unwrap_or_default(),
                    knowledge_base.os_version()
                );
                break;
            }
        }
        Ok(())
    }
}

/// Finds a child entry of `directory` by case-insensitive name
fn find_child(directory: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().to_lowercase() == name {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads a text file, `None` if it does not exist
fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(String::from_utf8_lossy(&data).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn os_release_value(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (name, value) = line.split_once('=')?;
        (name.trim() == key).then(|| value.trim().trim_matches('"').to_string())
    })
}

/// Extracts `Area/City` from a link into a zoneinfo directory
fn zoneinfo_name(target: &Path) -> Option<String> {
    let target = target.to_string_lossy();
    let (_, name) = target.split_once("zoneinfo/")?;
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_detects_windows() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("WINDOWS").join("System32")).unwrap();
        fs::create_dir_all(dir.path().join("Documents and Settings")).unwrap();

        let mut knowledge_base = KnowledgeBase::new();
        FileSystemPreprocessor::new()
            .preprocess(&[PathSpec::os(dir.path())], &mut knowledge_base)
            .unwrap();

        assert_eq!(knowledge_base.os_guess(), Some(OperatingSystem::Windows));
        assert_eq!(knowledge_base.path_attribute("SystemRoot"), Some("/WINDOWS"));
        assert_eq!(
            knowledge_base.path_attribute("users"),
            Some("/Documents and Settings")
        );
        assert_eq!(knowledge_base.os_version(), "Windows XP");
    }

    #[test]
    fn test_windows_users_directory_leaves_version_unset() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Windows").join("System32")).unwrap();
        fs::create_dir_all(dir.path().join("Users")).unwrap();
        fs::create_dir_all(dir.path().join("Documents and Settings")).unwrap();

        let mut knowledge_base = KnowledgeBase::new();
        FileSystemPreprocessor::new()
            .preprocess(&[PathSpec::os(dir.path())], &mut knowledge_base)
            .unwrap();

        assert_eq!(knowledge_base.path_attribute("users"), Some("/Users"));
        assert_eq!(knowledge_base.os_version(), "");
    }

    #[test]
    fn test_detects_linux() {
        let dir = tempdir().unwrap();
        let etc = dir.path().join("etc");
        fs::create_dir_all(&etc).unwrap();
        fs::write(
            etc.join("os-release"),
            "NAME=\"Ubuntu\"\nPRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\n",
        )
        .unwrap();
        fs::write(etc.join("hostname"), "evidence-host\n").unwrap();
        fs::write(etc.join("timezone"), "Europe/Berlin\n").unwrap();

        let mut knowledge_base = KnowledgeBase::new();
        FileSystemPreprocessor::new()
            .preprocess(&[PathSpec::os(dir.path())], &mut knowledge_base)
            .unwrap();

        assert_eq!(knowledge_base.os_guess(), Some(OperatingSystem::Linux));
        assert_eq!(knowledge_base.os_version(), "Ubuntu 22.04.3 LTS");
        assert_eq!(knowledge_base.hostname(), Some("evidence-host"));
        assert_eq!(knowledge_base.timezone_name(), Some("Europe/Berlin"));
    }

    #[test]
    fn test_detects_macosx_version() {
        let dir = tempdir().unwrap();
        let core_services = dir.path().join("System/Library/CoreServices");
        fs::create_dir_all(&core_services).unwrap();
        fs::write(
            core_services.join("SystemVersion.plist"),
            "<dict>\n<key>ProductName</key>\n<string>Mac OS X</string>\n\
             <key>ProductVersion</key>\n<string>10.9.5</string>\n</dict>",
        )
        .unwrap();

        let mut knowledge_base = KnowledgeBase::new();
        FileSystemPreprocessor::new()
            .preprocess(&[PathSpec::os(dir.path())], &mut knowledge_base)
            .unwrap();

        assert_eq!(knowledge_base.os_guess(), Some(OperatingSystem::MacOsx));
        assert_eq!(knowledge_base.os_version(), "Mac OS X 10.9.5");
    }

    #[test]
    fn test_plist_strings_pairs_keys_with_values() {
        let strings = plist_strings(
            "<key>ProductVersion</key>\n  <string> 10.4.11 </string>\n\
             <key>Flags</key><true/>\n<key>ProductBuildVersion</key><string>8S165</string>",
        )
        .unwrap();

        assert_eq!(strings.get("ProductVersion").map(String::as_str), Some("10.4.11"));
        assert_eq!(strings.get("ProductBuildVersion").map(String::as_str), Some("8S165"));
        assert!(!strings.contains_key("ProductName"));
        assert!(!strings.contains_key("Flags"));
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = tempdir().unwrap();
        let mut knowledge_base = KnowledgeBase::new();
        let result = FileSystemPreprocessor::new()
            .preprocess(&[PathSpec::os(dir.path().join("gone"))], &mut knowledge_base);
        assert!(result.is_err());
        assert!(knowledge_base.os_guess().is_none());
    }

    #[test]
    fn test_unknown_layout_leaves_knowledge_base_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"nothing").unwrap();

        let mut knowledge_base = KnowledgeBase::new();
        FileSystemPreprocessor::new()
            .preprocess(&[PathSpec::os(dir.path())], &mut knowledge_base)
            .unwrap();
        assert!(knowledge_base.os_guess().is_none());
    }
}
