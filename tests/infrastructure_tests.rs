//! Infrastructure layer tests
//!
//! Tests for the built-in registry, source scanning and the JSON lines
//! storage writer driven through a complete run.

use loupe::domain::entities::{PathSpecKind, SourceType};
use loupe::domain::repositories::{ParserRegistry, RegistryError};
use loupe::infrastructure::persistence::JsonLinesStorageFactory;
use loupe::infrastructure::registry::StaticParserRegistry;
use loupe::infrastructure::{default_engine_services, scan_source};
use loupe::{ExtractionFrontend, ProcessingOptions};
use rstest::*;
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Registry Tests
// ============================================================================

#[fixture]
fn registry() -> StaticParserRegistry {
    StaticParserRegistry::builtin()
}

#[rstest]
#[case("winxp", "winevt", true)]
#[case("winxp", "winevtx", false)]
#[case("win7", "winevtx", true)]
#[case("win7", "recycle_bin_info2", false)]
#[case("linux", "syslog", true)]
#[case("macosx", "plist/airport", true)]
fn test_builtin_preset_members(
    registry: StaticParserRegistry,
    #[case] preset: &str,
    #[case] name: &str,
    #[case] expected: bool,
) {
    let names = registry.list_parser_and_plugin_names(Some(preset)).unwrap();
    assert_eq!(names.iter().any(|n| n == name), expected, "{preset} -> {name}");
}

#[rstest]
fn test_nested_presets_expand_transitively(registry: StaticParserRegistry) {
    // win7 includes win_gen, which includes webhist.
    let win7 = registry.list_parser_and_plugin_names(Some("win7")).unwrap();
    let webhist = registry.list_parser_and_plugin_names(Some("webhist")).unwrap();
    assert!(webhist.iter().all(|name| win7.contains(name)));
}

#[rstest]
fn test_exclusions_apply_after_expansion(registry: StaticParserRegistry) {
    let names = registry
        .list_parser_and_plugin_names(Some("win7,!filestat,!winreg/userassist"))
        .unwrap();
    assert!(!names.contains(&"filestat".to_string()));
    assert!(!names.contains(&"winreg/userassist".to_string()));
    assert!(names.contains(&"winreg/windows_run".to_string()));
}

#[rstest]
fn test_no_expression_enables_everything(registry: StaticParserRegistry) {
    let all = registry.list_parser_and_plugin_names(None).unwrap();
    let parsers = registry.parsers_information();
    assert!(all.len() > parsers.len());
    assert!(parsers.iter().all(|parser| all.contains(&parser.name)));
}

#[rstest]
#[case("nosuchparser")]
#[case("winxp,!")]
#[case("winreg/nosuchplugin")]
fn test_unknown_names_are_rejected(registry: StaticParserRegistry, #[case] expression: &str) {
    assert!(matches!(
        registry.list_parser_and_plugin_names(Some(expression)),
        Err(RegistryError::InvalidFilterExpression(_))
    ));
}

#[rstest]
#[case(None, vec![])]
#[case(Some("all"), vec!["md5", "sha256"])]
#[case(Some("sha256,md5,sha256"), vec!["md5", "sha256"])]
fn test_hasher_names(
    registry: StaticParserRegistry,
    #[case] hashers: Option<&str>,
    #[case] expected: Vec<&str>,
) {
    let mut names = registry.list_hasher_names(hashers);
    names.sort();
    assert_eq!(names, expected);
}

// ============================================================================
// Source Scanner Tests
// ============================================================================

#[rstest]
#[case("evidence.raw", SourceType::StorageMediaImage, PathSpecKind::StorageMediaImage)]
#[case("evidence.E01", SourceType::StorageMediaImage, PathSpecKind::StorageMediaImage)]
#[case("notes.txt", SourceType::File, PathSpecKind::Os)]
fn test_scan_file_sources(
    #[case] name: &str,
    #[case] source_type: SourceType,
    #[case] kind: PathSpecKind,
) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, b"data").unwrap();

    let (path_spec, scanned) = scan_source(&path).unwrap();
    assert_eq!(scanned, source_type);
    assert_eq!(path_spec.kind(), kind);
    assert_eq!(path_spec.location(), path.as_path());
}

#[rstest]
fn test_scan_directory_and_missing_sources() {
    let dir = tempfile::tempdir().unwrap();
    let (_, scanned) = scan_source(dir.path()).unwrap();
    assert_eq!(scanned, SourceType::Directory);
    assert!(scan_source(&dir.path().join("absent")).is_err());
}

// ============================================================================
// JSON Lines Run Tests
// ============================================================================

#[fixture]
fn linux_source() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let etc = dir.path().join("etc");
    fs::create_dir_all(&etc).unwrap();
    fs::write(etc.join("os-release"), "PRETTY_NAME=\"Debian GNU/Linux 12\"\n").unwrap();
    fs::write(etc.join("hostname"), "evidence\n").unwrap();
    fs::write(etc.join("timezone"), "Europe/Berlin\n").unwrap();
    fs::create_dir_all(dir.path().join("home/user")).unwrap();
    fs::write(dir.path().join("home/user/.bash_history"), "ls\n").unwrap();
    dir
}

fn read_records(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[rstest]
fn test_directory_run_writes_json_lines(linux_source: TempDir) {
    let output = tempfile::tempdir().unwrap();
    let storage_file = output.path().join("timeline.jsonl");

    let mut frontend = ExtractionFrontend::new(
        Arc::new(StaticParserRegistry::builtin()),
        Arc::new(JsonLinesStorageFactory::new()),
        default_engine_services(),
    );
    frontend.set_storage_file(&storage_file);

    let (path_spec, source_type) = scan_source(linux_source.path()).unwrap();
    let status = frontend
        .process_sources(
            &[path_spec],
            source_type,
            ProcessingOptions::new().with_workers(2).with_hashers("md5"),
        )
        .unwrap();

    // Creation time is not available on every file system.
    assert_eq!(status.sources_processed, 4);
    assert!(status.events >= 8);

    let records = read_records(&storage_file);
    assert_eq!(records.first().unwrap()["record_type"], "session_start");
    assert_eq!(records.last().unwrap()["record_type"], "session_completion");

    let session = &records[0]["session"];
    assert_eq!(session["parser_filter_expression"], "linux");
    assert!(
        session["enabled_parser_names"]
            .as_array()
            .unwrap()
            .iter()
            .any(|name| name == "syslog")
    );

    let events: Vec<_> = records
        .iter()
        .filter(|record| record["record_type"] == "event")
        .collect();
    assert_eq!(events.len() as u64, status.events);
    assert!(
        events
            .iter()
            .all(|record| record["event"]["attributes"]["md5_hash"].is_string())
    );
}

#[rstest]
fn test_second_run_appends_to_storage_file(linux_source: TempDir) {
    let output = tempfile::tempdir().unwrap();
    let storage_file = output.path().join("timeline.jsonl");

    let mut frontend = ExtractionFrontend::new(
        Arc::new(StaticParserRegistry::builtin()),
        Arc::new(JsonLinesStorageFactory::new()),
        default_engine_services(),
    );
    frontend.set_storage_file(&storage_file);

    let (path_spec, source_type) = scan_source(linux_source.path()).unwrap();
    for _ in 0..2 {
        frontend
            .process_sources(
                std::slice::from_ref(&path_spec),
                source_type,
                ProcessingOptions::new().single_process(),
            )
            .unwrap();
    }

    let starts = read_records(&storage_file)
        .iter()
        .filter(|record| record["record_type"] == "session_start")
        .count();
    assert_eq!(starts, 2);
}

// ============================================================================
// Derived Preset Tests
// ============================================================================

#[rstest]
#[case("Documents and Settings", "winxp")]
#[case("Users", "win7")]
fn test_windows_profile_directory_selects_preset(#[case] profiles: &str, #[case] preset: &str) {
    let source = tempfile::tempdir().unwrap();
    fs::create_dir_all(source.path().join("WINDOWS/system32")).unwrap();
    fs::create_dir_all(source.path().join(profiles).join("alice")).unwrap();
    fs::write(source.path().join(profiles).join("alice/ntuser.dat"), b"regf").unwrap();

    let output = tempfile::tempdir().unwrap();
    let storage_file = output.path().join("timeline.jsonl");
    let mut frontend = ExtractionFrontend::new(
        Arc::new(StaticParserRegistry::builtin()),
        Arc::new(JsonLinesStorageFactory::new()),
        default_engine_services(),
    );
    frontend.set_storage_file(&storage_file);

    let (path_spec, source_type) = scan_source(source.path()).unwrap();
    frontend
        .process_sources(&[path_spec], source_type, ProcessingOptions::new().single_process())
        .unwrap();

    let records = read_records(&storage_file);
    assert_eq!(records[0]["session"]["parser_filter_expression"], preset);
}
