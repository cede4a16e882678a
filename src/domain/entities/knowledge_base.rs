//! Knowledge base entity
//!
//! Facts about the source environment. Populated by preprocessing and read
//! by the later resolution steps of a run.

use crate::core::ExtractionError;
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Operating system guessed from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperatingSystem {
    Linux,
    MacOsx,
    Windows,
}

impl OperatingSystem {
    pub fn name(&self) -> &'static str {
        match self {
            OperatingSystem::Linux => "Linux",
            OperatingSystem::MacOsx => "MacOSX",
            OperatingSystem::Windows => "Windows",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperatingSystem {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Linux" => Ok(OperatingSystem::Linux),
            "MacOSX" => Ok(OperatingSystem::MacOsx),
            "Windows" => Ok(OperatingSystem::Windows),
            other => Err(format!("unknown operating system: {other}")),
        }
    }
}

/// Environment facts discovered about the source
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeBase {
    os_guess: Option<OperatingSystem>,
    os_version: Option<String>,
    hostname: Option<String>,
    /// Time zone name as discovered in the source, not yet validated
    timezone_name: Option<String>,
    #[serde(serialize_with = "serialize_timezone")]
    timezone: Tz,
    path_attributes: BTreeMap<String, String>,
}

fn serialize_timezone<S: serde::Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            os_guess: None,
            os_version: None,
            hostname: None,
            timezone_name: None,
            timezone: Tz::UTC,
            path_attributes: BTreeMap::new(),
        }
    }
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn os_guess(&self) -> Option<OperatingSystem> {
        self.os_guess
    }

    pub fn set_os_guess(&mut self, os: OperatingSystem) {
        self.os_guess = Some(os);
    }

    /// Returns the operating system version, empty if unknown
    pub fn os_version(&self) -> &str {
        self.os_version.as_deref().unwrap_or("")
    }

    pub fn set_os_version(&mut self, version: impl Into<String>) {
        self.os_version = Some(version.into());
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn set_hostname(&mut self, hostname: impl Into<String>) {
        self.hostname = Some(hostname.into());
    }

    /// Returns the time zone name discovered in the source, if any
    pub fn timezone_name(&self) -> Option<&str> {
        self.timezone_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn set_timezone_name(&mut self, name: impl Into<String>) {
        self.timezone_name = Some(name.into());
    }

    /// Returns the active time zone
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Sets the active time zone
    ///
    /// Fails with `UnsupportedTimezone` if the name is not a known IANA zone;
    /// the previous time zone is kept in that case.
    pub fn set_timezone(&mut self, name: &str) -> Result<(), ExtractionError> {
        let timezone = Tz::from_str(name.trim())
            .map_err(|_| ExtractionError::UnsupportedTimezone(name.to_string()))?;
        self.timezone = timezone;
        Ok(())
    }

    pub fn path_attributes(&self) -> &BTreeMap<String, String> {
        &self.path_attributes
    }

    /// Sets a path attribute; names are case-insensitive
    pub fn set_path_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.path_attributes
            .insert(name.to_lowercase(), value.into());
    }

    pub fn path_attribute(&self, name: &str) -> Option<&str> {
        self.path_attributes
            .get(&name.to_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_utc() {
        let knowledge_base = KnowledgeBase::new();
        assert_eq!(knowledge_base.timezone(), Tz::UTC);
        assert_eq!(knowledge_base.os_version(), "");
        assert!(knowledge_base.timezone_name().is_none());
    }

    #[test]
    fn test_set_timezone_keeps_previous_on_error() {
        let mut knowledge_base = KnowledgeBase::new();
        knowledge_base.set_timezone("Europe/Amsterdam").unwrap();

        let result = knowledge_base.set_timezone("Mars/Olympus_Mons");
        assert!(matches!(result, Err(ExtractionError::UnsupportedTimezone(_))));
        assert_eq!(knowledge_base.timezone(), Tz::Europe__Amsterdam);
    }

    #[test]
    fn test_path_attributes_are_case_insensitive() {
        let mut knowledge_base = KnowledgeBase::new();
        knowledge_base.set_path_attribute("SystemRoot", "/Windows");
        assert_eq!(knowledge_base.path_attribute("systemroot"), Some("/Windows"));
    }

    #[test]
    fn test_operating_system_round_trip_names() {
        assert_eq!("MacOSX".parse::<OperatingSystem>(), Ok(OperatingSystem::MacOsx));
        assert!("BeOS".parse::<OperatingSystem>().is_err());
    }
}
