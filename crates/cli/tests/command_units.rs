mod common;

use std::fs;

use pe_ngram::commands::{
    analyze_command, list_strategies_command, load_run_config, resolve_configs,
    sections_command, strategy_listing, AnalyzeOptions,
};
use tempfile::tempdir;

use common::write_sample;

#[test]
fn flags_override_config_file_values() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("run.json");
    fs::write(
        &config,
        r#"{"dimension": 3, "model_strategy": "descending-frequency", "truncate_below": 0.05, "ring_capacity": 128}"#,
    )
    .unwrap();

    let opts = AnalyzeOptions {
        dimension: Some(1),
        ring_capacity: Some(32),
        report: Some("te".into()),
        config: Some(config.to_string_lossy().to_string()),
        ..AnalyzeOptions::default()
    };
    let (engine, report) = resolve_configs(&opts).unwrap();
    assert_eq!(engine.dimension.get(), 1);
    assert_eq!(engine.ring_capacity, 32);
    assert_eq!(engine.truncate_below, Some(0.05));
    assert_eq!(engine.region_strategy, "max-entropy-section");
    assert!(report.flags.entropy && report.flags.ngram && !report.flags.image);
}

#[test]
fn dimension_is_required_from_flag_or_file() {
    let err = resolve_configs(&AnalyzeOptions::default()).unwrap_err();
    assert!(err.to_string().contains("No dimension given"));
}

#[test]
fn config_loader_rejects_unknown_extension_and_fields() {
    let tmp = tempdir().unwrap();
    let toml = tmp.path().join("run.toml");
    fs::write(&toml, "dimension = 1").unwrap();
    let err = load_run_config(&toml).unwrap_err();
    assert!(err.to_string().contains("Unsupported config file extension"));

    let yaml = tmp.path().join("run.yml");
    fs::write(&yaml, "dimension: 1\nbogus: true\n").unwrap();
    let err = load_run_config(&yaml).unwrap_err();
    assert!(err.to_string().contains("Failed to parse YAML config"));

    fs::write(&yaml, "dimension: 7\n").unwrap();
    assert!(load_run_config(&yaml).is_err());
}

#[test]
fn analyze_errors_when_input_missing() {
    let tmp = tempdir().unwrap();
    let opts = AnalyzeOptions {
        input: tmp.path().join("nope.exe").to_string_lossy().to_string(),
        output: tmp.path().to_string_lossy().to_string(),
        dimension: Some(1),
        ..AnalyzeOptions::default()
    };
    let err = analyze_command(&opts).unwrap_err();
    assert!(err.to_string().contains("Input file does not exist"), "unexpected error: {err}");
}

#[test]
fn analyze_rejects_undersized_ring() {
    let tmp = tempdir().unwrap();
    let input = write_sample(tmp.path(), "alt.exe");
    let opts = AnalyzeOptions {
        input: input.to_string_lossy().to_string(),
        output: tmp.path().join("out").to_string_lossy().to_string(),
        dimension: Some(4),
        ring_capacity: Some(7),
        ..AnalyzeOptions::default()
    };
    let err = analyze_command(&opts).unwrap_err();
    assert!(err.to_string().contains("Invalid engine configuration"));
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn analyze_runs_in_process() {
    let tmp = tempdir().unwrap();
    let input = write_sample(tmp.path(), "inproc.exe");
    let out = tmp.path().join("out");
    let opts = AnalyzeOptions {
        input: input.to_string_lossy().to_string(),
        output: out.to_string_lossy().to_string(),
        dimension: Some(2),
        report: Some("et".into()),
        json: true,
        ..AnalyzeOptions::default()
    };
    analyze_command(&opts).unwrap();
    assert!(out.join("inproc.entropy.txt").is_file());
    assert!(out.join("inproc.ngram.txt").is_file());
    assert!(!out.join("inproc.ngram.plt").exists());
}

#[test]
fn listing_and_sections_commands_succeed() {
    list_strategies_command(false).unwrap();
    list_strategies_command(true).unwrap();
    let listing = strategy_listing();
    assert_eq!(listing.region[0].name, "max-entropy-section");
    assert_eq!(listing.model.len(), 1);

    let tmp = tempdir().unwrap();
    let input = write_sample(tmp.path(), "sec.exe");
    sections_command(&input.to_string_lossy(), false).unwrap();
    sections_command(&input.to_string_lossy(), true).unwrap();
    assert!(sections_command(&tmp.path().join("missing").to_string_lossy(), false).is_err());
}
