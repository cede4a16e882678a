//! Find specification builder
//!
//! Reads a filter file: one location per line, `#` starts a comment, and
//! `{attribute}` is replaced by the matching knowledge base path attribute.

use crate::core::{ExtractionError, Result};
use crate::domain::entities::{FindSpec, FindSpecSet};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const ATTRIBUTE_PATTERN: &str = r"\{([A-Za-z0-9_]+)\}";

/// Expands `{attribute}` references in a filter line
///
/// Attribute values are literal paths and are escaped segment by segment.
/// Returns `None` if the line references an unknown attribute.
fn expand_path_attributes(
    attribute_pattern: &Regex,
    line: &str,
    path_attributes: &BTreeMap<String, String>,
) -> Option<String> {
    let mut missing = false;
    let expanded = attribute_pattern.replace_all(line, |captures: &Captures| {
        let name = captures[1].to_lowercase();
        match path_attributes.get(&name) {
            Some(value) => value
                .replace('\\', "/")
                .split('/')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("/"),
            None => {
                missing = true;
                String::new()
            }
        }
    });

    (!missing).then(|| expanded.into_owned())
}

/// Builds find specifications from filter file content
pub fn build_find_specs(
    content: &str,
    path_attributes: &BTreeMap<String, String>,
) -> Result<FindSpecSet> {
    let attribute_pattern = Regex::new(ATTRIBUTE_PATTERN)
        .map_err(|e| ExtractionError::InvalidConfiguration(e.to_string()))?;
    let mut specs = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(location) = expand_path_attributes(&attribute_pattern, line, path_attributes) else {
            tracing::warn!(
                "Skipping filter line {}: unknown path attribute in {}",
                index + 1,
                line
            );
            continue;
        };

        let spec = FindSpec::from_location(&location).map_err(|e| {
            ExtractionError::InvalidConfiguration(format!(
                "invalid filter on line {}: {}",
                index + 1,
                e
            ))
        })?;
        specs.push(spec);
    }

    Ok(FindSpecSet::new(specs))
}

/// Reads a filter file and builds its find specifications
pub fn build_find_specs_from_file(
    filter_file: &Path,
    path_attributes: &BTreeMap<String, String>,
) -> Result<FindSpecSet> {
    let content = fs::read_to_string(filter_file).map_err(|e| {
        ExtractionError::InvalidConfiguration(format!(
            "unable to read filter file {}: {}",
            filter_file.display(),
            e
        ))
    })?;

    let specs = build_find_specs(&content, path_attributes)?;
    tracing::debug!(
        "Built {} find specifications from {}",
        specs.len(),
        filter_file.display()
    );
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes() -> BTreeMap<String, String> {
        BTreeMap::from([("systemroot".to_string(), "\\Windows".to_string())])
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let specs = build_find_specs("# registry\n\n/etc/passwd\n", &BTreeMap::new()).unwrap();
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn test_path_attribute_expansion() {
        let specs = build_find_specs("{SystemRoot}/System32/config/SAM", &attributes()).unwrap();
        assert!(specs.matches(Path::new("Windows/System32/config/SAM")));
    }

    #[test]
    fn test_unknown_attribute_skips_line() {
        let specs = build_find_specs("{users}/.+/NTUSER.DAT\n/etc/hosts", &attributes()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs.specs()[0].location(), "/etc/hosts");
    }

    #[test]
    fn test_invalid_regex_is_invalid_configuration() {
        let result = build_find_specs("/var/[log", &BTreeMap::new());
        assert!(matches!(result, Err(ExtractionError::InvalidConfiguration(_))));
    }
}
