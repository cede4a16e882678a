//! Domain layer tests
//!
//! Tests for entities and domain services.

use loupe::domain::entities::{
    FindSpec, KnowledgeBase, OperatingSystem, PathSpec, ProcessingState, ProcessingStatus,
    SourceType,
};
use loupe::domain::services::{ParserFilter, ParserPreset, resolve_parser_filter_preset};
use loupe::ExtractionError;
use proptest::prelude::*;
use rstest::*;
use std::path::Path;
use uuid::Uuid;

// ============================================================================
// Parser Preset Tests
// ============================================================================

#[rstest]
#[case(None, "Windows XP", Some(ParserPreset::WinXp))]
#[case(None, "Windows XP Professional", Some(ParserPreset::WinXp))]
#[case(None, "windows server 2000", Some(ParserPreset::WinXp))]
#[case(None, "Windows Server 2003 R2", Some(ParserPreset::WinXp))]
#[case(None, "Windows 10", Some(ParserPreset::Win7))]
#[case(None, "Windows Server 2012", Some(ParserPreset::Win7))]
#[case(Some(OperatingSystem::Linux), "", Some(ParserPreset::Linux))]
#[case(Some(OperatingSystem::MacOsx), "", Some(ParserPreset::MacOsx))]
#[case(Some(OperatingSystem::Windows), "", Some(ParserPreset::Win7))]
#[case(Some(OperatingSystem::MacOsx), "Windows 7 Ultimate", Some(ParserPreset::Win7))]
#[case(None, "", None)]
fn test_resolve_parser_filter_preset(
    #[case] os_guess: Option<OperatingSystem>,
    #[case] os_version: &str,
    #[case] expected: Option<ParserPreset>,
) {
    assert_eq!(resolve_parser_filter_preset(os_guess, os_version), expected);
}

fn os_guess_strategy() -> impl Strategy<Value = Option<OperatingSystem>> {
    prop_oneof![
        Just(None),
        Just(Some(OperatingSystem::Linux)),
        Just(Some(OperatingSystem::MacOsx)),
        Just(Some(OperatingSystem::Windows)),
    ]
}

proptest! {
    #[test]
    fn test_preset_resolution_is_deterministic(
        os_guess in os_guess_strategy(),
        os_version in ".{0,40}",
    ) {
        let first = resolve_parser_filter_preset(os_guess, &os_version);
        let second = resolve_parser_filter_preset(os_guess, &os_version);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_any_windows_version_selects_a_windows_preset(
        prefix in "[a-z ]{0,10}",
        suffix in "[a-z0-9 ]{0,10}",
    ) {
        let version = format!("{prefix}Windows{suffix}");
        let preset = resolve_parser_filter_preset(None, &version);
        prop_assert!(matches!(preset, Some(ParserPreset::WinXp) | Some(ParserPreset::Win7)));
    }

    #[test]
    fn test_without_version_the_guess_decides(os_guess in os_guess_strategy()) {
        let preset = resolve_parser_filter_preset(os_guess, "");
        prop_assert_eq!(preset.is_some(), os_guess.is_some());
    }
}

// ============================================================================
// Knowledge Base Tests
// ============================================================================

#[fixture]
fn knowledge_base() -> KnowledgeBase {
    let mut knowledge_base = KnowledgeBase::new();
    knowledge_base.set_os_guess(OperatingSystem::Windows);
    knowledge_base.set_os_version("Windows 7 Professional");
    knowledge_base.set_path_attribute("SystemRoot", "\\Windows");
    knowledge_base
}

#[rstest]
fn test_path_attributes_are_case_insensitive(knowledge_base: KnowledgeBase) {
    assert_eq!(knowledge_base.path_attribute("systemroot"), Some("\\Windows"));
    assert_eq!(knowledge_base.path_attribute("SYSTEMROOT"), Some("\\Windows"));
}

#[rstest]
fn test_unsupported_timezone_keeps_previous(mut knowledge_base: KnowledgeBase) {
    knowledge_base.set_timezone("Europe/Paris").unwrap();
    let result = knowledge_base.set_timezone("Atlantis/Central");

    assert!(matches!(result, Err(ExtractionError::UnsupportedTimezone(_))));
    assert_eq!(knowledge_base.timezone().name(), "Europe/Paris");
}

#[rstest]
#[case("Linux", OperatingSystem::Linux)]
#[case("MacOSX", OperatingSystem::MacOsx)]
#[case("Windows", OperatingSystem::Windows)]
fn test_operating_system_names_round_trip(#[case] name: &str, #[case] os: OperatingSystem) {
    assert_eq!(name.parse::<OperatingSystem>().unwrap(), os);
    assert_eq!(os.name(), name);
}

// ============================================================================
// Source Type Tests
// ============================================================================

#[rstest]
#[case(SourceType::File, false)]
#[case(SourceType::Directory, true)]
#[case(SourceType::StorageMediaDevice, true)]
#[case(SourceType::StorageMediaImage, true)]
#[case(SourceType::Other, false)]
fn test_source_type_requires_preprocessing(#[case] source_type: SourceType, #[case] expected: bool) {
    assert_eq!(source_type.requires_preprocessing(), expected);
}

#[rstest]
fn test_path_spec_parent_chain() {
    let image = PathSpec::os("/cases/disk.raw");
    let entry = PathSpec::os("/Windows/System32").with_parent(image.clone());
    assert_eq!(entry.parent(), Some(&image));
    assert_eq!(entry.location(), Path::new("/Windows/System32"));
}

// ============================================================================
// Find Specification Tests
// ============================================================================

#[rstest]
#[case("/Windows/System32/config/SAM", "windows/system32/CONFIG/sam", true)]
#[case("/Users/.+/NTUSER.DAT", "Users/alice/NTUSER.DAT", true)]
#[case("/Users/.+/NTUSER.DAT", "Users/alice/Desktop/NTUSER.DAT", false)]
#[case("/etc/passwd", "etc/passwd.bak", false)]
fn test_find_spec_matches(#[case] location: &str, #[case] path: &str, #[case] expected: bool) {
    let spec = FindSpec::from_location(location).unwrap();
    assert_eq!(spec.matches(Path::new(path)), expected);
}

// ============================================================================
// Parser Filter Tests
// ============================================================================

#[rstest]
#[case("winxp", vec!["winxp"], vec![])]
#[case("Linux, !syslog", vec!["linux"], vec!["syslog"])]
#[case("sqlite/chrome_history,!filestat", vec!["sqlite/chrome_history"], vec!["filestat"])]
fn test_parser_filter_parse(
    #[case] expression: &str,
    #[case] includes: Vec<&str>,
    #[case] excludes: Vec<&str>,
) {
    let filter = ParserFilter::parse(expression).unwrap();
    assert_eq!(filter.includes, includes);
    assert_eq!(filter.excludes, excludes);
}

#[rstest]
#[case("")]
#[case("winxp,")]
#[case("win xp")]
#[case("/plugin")]
fn test_parser_filter_rejects_malformed(#[case] expression: &str) {
    assert!(ParserFilter::parse(expression).is_err());
}

// ============================================================================
// Processing Status Tests
// ============================================================================

#[rstest]
fn test_processing_status_finish() {
    let mut status = ProcessingStatus::new(Uuid::new_v4());
    assert_eq!(status.state(), ProcessingState::Running);
    assert!(status.end_time().is_none());

    status.finish(ProcessingState::Aborted);
    assert!(status.is_aborted());
    assert!(status.end_time().is_some());
}

#[rstest]
fn test_worker_status_is_created_on_demand() {
    let mut status = ProcessingStatus::new(Uuid::new_v4());
    status.worker_mut(2).events_produced += 3;

    let worker = status.workers.iter().find(|w| w.identifier == 2).unwrap();
    assert_eq!(worker.events_produced, 3);
}
