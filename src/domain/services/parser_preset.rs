//! Parser filter preset resolution
//!
//! Maps the operating system facts found by preprocessing to a named
//! parser preset. The heuristic is intentionally coarse: only a handful of
//! Windows versions select `winxp`, every other Windows falls back to
//! `win7`. Changing the mapping changes which parsers run by default.

use crate::domain::entities::OperatingSystem;
use std::fmt;

/// Parser presets selectable from environment facts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserPreset {
    WinXp,
    Win7,
    Linux,
    MacOsx,
}

impl ParserPreset {
    /// Returns the preset name as understood by the parser registry
    pub fn name(&self) -> &'static str {
        match self {
            ParserPreset::WinXp => "winxp",
            ParserPreset::Win7 => "win7",
            ParserPreset::Linux => "linux",
            ParserPreset::MacOsx => "macosx",
        }
    }
}

impl fmt::Display for ParserPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const WINXP_VERSIONS: [&str; 3] = ["windows xp", "windows server 2000", "windows server 2003"];

/// Resolves the parser preset for a guessed operating system and version
///
/// The version string takes priority over the guess. `None` means every
/// parser and plugin is enabled.
///
/// # Example
///
/// ```
/// use loupe::domain::services::{resolve_parser_filter_preset, ParserPreset};
///
/// let preset = resolve_parser_filter_preset(None, "Windows Server 2003 R2");
/// assert_eq!(preset, Some(ParserPreset::WinXp));
/// ```
pub fn resolve_parser_filter_preset(
    os_guess: Option<OperatingSystem>,
    os_version: &str,
) -> Option<ParserPreset> {
    if !os_version.is_empty() {
        let os_version = os_version.to_lowercase();

        if WINXP_VERSIONS.iter().any(|v| os_version.contains(v)) {
            return Some(ParserPreset::WinXp);
        }
        if os_version.contains("windows") {
            return Some(ParserPreset::Win7);
        }
    }

    match os_guess? {
        OperatingSystem::Linux => Some(ParserPreset::Linux),
        OperatingSystem::MacOsx => Some(ParserPreset::MacOsx),
        OperatingSystem::Windows => Some(ParserPreset::Win7),
    }
}
