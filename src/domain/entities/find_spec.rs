//! Find specification entity
//!
//! Restricts which file entries of a source are considered for extraction.

use regex::Regex;
use std::path::{Component, Path};

/// Location pattern made of one case-insensitive regex per path segment
#[derive(Debug, Clone)]
pub struct FindSpec {
    location: String,
    segments: Vec<Regex>,
}

impl FindSpec {
    /// Builds a find specification from a `/` separated location
    ///
    /// Every segment is an anchored, case-insensitive regular expression.
    pub fn from_location(location: &str) -> Result<Self, regex::Error> {
        let segments = location
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| Regex::new(&format!("(?i)^(?:{segment})$")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            location: location.to_string(),
            segments,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Checks a location relative to the source root
    pub fn matches(&self, relative_location: &Path) -> bool {
        let components: Vec<_> = relative_location
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect();

        components.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&components)
                .all(|(regex, name)| regex.is_match(name))
    }
}

/// Set of find specifications; an entry is kept if any of them matches
#[derive(Debug, Clone, Default)]
pub struct FindSpecSet {
    specs: Vec<FindSpec>,
}

impl FindSpecSet {
    pub fn new(specs: Vec<FindSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[FindSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn matches(&self, relative_location: &Path) -> bool {
        self.specs.iter().any(|spec| spec.matches(relative_location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_regex_is_anchored_and_case_insensitive() {
        let spec = FindSpec::from_location("/Windows/System32/config/SAM").unwrap();
        assert!(spec.matches(Path::new("windows/system32/CONFIG/sam")));
        assert!(!spec.matches(Path::new("Windows/System32/config/SAM.LOG")));
        assert!(!spec.matches(Path::new("Windows/System32/config")));
    }

    #[test]
    fn test_segment_regex_wildcards() {
        let spec = FindSpec::from_location("/Users/.+/NTUSER.DAT").unwrap();
        assert!(spec.matches(Path::new("Users/alice/NTUSER.DAT")));
        assert!(!spec.matches(Path::new("Users/NTUSER.DAT")));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        assert!(FindSpec::from_location("/var/log/(unclosed").is_err());
    }
}
