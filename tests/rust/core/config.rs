//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.

use std::io::Write;

use tumap::config::{TuCTranslatorConfig, TuCTranslatorConfigBuilder};
use tumap::{TuCPlanFormat, TuCSyntax, TuCTranslator};

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_defaults() {
    let config = TuCTranslatorConfig::default();
    assert_eq!(config.syntax, None);
    assert!(config.share_sources);
    assert_eq!(config.output_format, TuCPlanFormat::Text);
    assert!(!config.strict_sources);
    assert_eq!(TuCTranslatorConfigBuilder::TuFNew().TuFBuild(), config);
}

#[test]
fn test_config_from_yaml_file() {
    let file = write_temp(
        ".yaml",
        "syntax: shexml\nshare_sources: false\noutput_format: json\nlog:\n  level: debug\n",
    );
    let config = TuCTranslatorConfigBuilder::TuFFromFile(file.path()).unwrap().TuFBuild();
    assert_eq!(config.syntax, Some(TuCSyntax::ScriptStyle));
    assert!(!config.share_sources);
    assert_eq!(config.output_format, TuCPlanFormat::Json);
    assert_eq!(config.log.level, "debug");
    assert!(config.log.stderr_enabled);
}

#[test]
fn test_config_from_json_file() {
    let file = write_temp(".json", r#"{"strict_sources": true, "syntax": "rulebased"}"#);
    let config = TuCTranslatorConfigBuilder::TuFFromFile(file.path()).unwrap().TuFBuild();
    assert!(config.strict_sources);
    assert_eq!(config.syntax, Some(TuCSyntax::RuleBased));
    assert!(config.share_sources);
}

#[test]
fn test_config_rejects_unknown_keys_and_extensions() {
    let unknown = write_temp(".json", r#"{"share_source": false}"#);
    let err = TuCTranslatorConfigBuilder::TuFFromFile(unknown.path()).unwrap_err();
    assert_eq!(err.TuFKind(), "ConfigError");

    let toml = write_temp(".toml", "share_sources = false\n");
    assert_eq!(
        TuCTranslatorConfigBuilder::TuFFromFile(toml.path()).unwrap_err().TuFKind(),
        "ConfigError"
    );

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    assert_eq!(
        TuCTranslatorConfigBuilder::TuFFromFile(&missing).unwrap_err().TuFKind(),
        "ConfigError"
    );
}

#[test]
fn test_config_merge_prefers_later_values() {
    let file = TuCTranslatorConfigBuilder::TuFFromYaml("share_sources: false\noutput_format: json\n").unwrap();
    let flags = TuCTranslatorConfigBuilder::TuFNew().TuFOutputFormat(TuCPlanFormat::Text);
    let config = file.TuFMerge(flags).TuFBuild();
    assert!(!config.share_sources);
    assert_eq!(config.output_format, TuCPlanFormat::Text);
}

#[test]
fn test_explicit_syntax_bypasses_detection() {
    // Read as Turtle, the first SOURCE keyword is not a valid subject.
    let doc = include_str!("../../fixtures/scenario_a.shexml");
    let forced = TuCTranslatorConfigBuilder::TuFNew().TuFSyntax(TuCSyntax::RuleBased).TuFBuild();
    let err = TuCTranslator::TuFNew(forced).TuFTranslate(doc).unwrap_err();
    assert_eq!(err.TuFKind(), "ParseError");

    let script = TuCTranslatorConfigBuilder::TuFNew().TuFSyntax(TuCSyntax::ScriptStyle).TuFBuild();
    assert!(TuCTranslator::TuFNew(script).TuFTranslate(doc).is_ok());
}

#[test]
fn test_strict_sources_flags_unread_source() {
    let doc = include_str!("../../fixtures/scenario_a.shexml");
    let strict = TuCTranslatorConfigBuilder::TuFNew().TuFStrictSources(true).TuFBuild();
    let err = TuCTranslator::TuFNew(strict).TuFTranslate(doc).unwrap_err();
    assert_eq!(
        err,
        tumap::TuCError::reference(
            "films_second_csv_file",
            "source is declared but no mapping unit reads it"
        )
    );
}
