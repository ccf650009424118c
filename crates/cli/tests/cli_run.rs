mod common;

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

use common::write_sample;

const NO_PLOTTER: &str = "pe-ngram-test-missing-gnuplot";

#[test]
fn run_writes_reports_for_sample() {
    let temp = tempdir().unwrap();
    let input = write_sample(temp.path(), "alt.exe");
    let out = temp.path().join("out");

    cargo_bin_cmd!("pe-ngram")
        .env("GNUPLOT_BIN", NO_PLOTTER)
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&out)
        .arg("--dimension")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyzed sample: alt"))
        .stdout(predicate::str::contains("Total tokens: 4089"));

    let entropy = fs::read_to_string(out.join("alt.entropy.txt")).unwrap();
    assert!(entropy.starts_with("Total: 2 sections.\n\n"));
    assert!(entropy.contains("Section    Name: .text___\n"));
    assert!(entropy.contains("\tThe empty section.\n"));
    let ngram = fs::read_to_string(out.join("alt.ngram.txt")).unwrap();
    assert_eq!(ngram.lines().count(), 16);
    assert!(out.join("alt.ngram.plt").is_file());
    assert!(!out.join("alt.ngram.png").exists());
}

#[test]
fn json_summary_describes_the_run() {
    let temp = tempdir().unwrap();
    let input = write_sample(temp.path(), "alt.exe");
    let out = temp.path().join("out");

    let output = cargo_bin_cmd!("pe-ngram")
        .env("GNUPLOT_BIN", NO_PLOTTER)
        .args(["--dimension", "1", "--report", "t", "--json"])
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).expect("run summary json");

    assert_eq!(body["sample"], "alt");
    assert_eq!(body["dimension"], 1);
    assert_eq!(body["region_strategy"], "max-entropy-section");
    assert_eq!(body["model_strategy"], "descending-frequency");
    assert_eq!(body["sections"], 2);
    assert_eq!(body["total_tokens"], 4089);
    assert_eq!(body["distinct_tokens"], 16);
    assert_eq!(body["slices"], 16);
    assert_eq!(body["denominator"]["value"], 0x2A);
    assert_eq!(body["sha256"].as_str().unwrap().len(), 64);
    assert!(body["analyzed_at"].as_str().is_some());
    assert!(body["reports"]["ngram"].as_str().unwrap().ends_with("alt.ngram.txt"));
    assert!(body["reports"].get("entropy").is_none());
    assert!(!out.join("alt.entropy.txt").exists());
}

#[test]
fn rerun_removes_stale_artifacts() {
    let temp = tempdir().unwrap();
    let input = write_sample(temp.path(), "alt.exe");
    let out = temp.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("alt.entropy.txt"), "stale").unwrap();
    fs::write(out.join("alt.ngram.png"), "stale").unwrap();

    cargo_bin_cmd!("pe-ngram")
        .env("GNUPLOT_BIN", NO_PLOTTER)
        .args(["-d", "1", "-r", "t"])
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(!out.join("alt.entropy.txt").exists());
    assert!(!out.join("alt.ngram.png").exists());
    assert!(out.join("alt.ngram.txt").is_file());
}

#[test]
fn missing_required_arguments_is_usage_error() {
    cargo_bin_cmd!("pe-ngram")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("required"));
}

#[test]
fn dimension_out_of_range_is_usage_error() {
    let temp = tempdir().unwrap();
    let input = write_sample(temp.path(), "alt.exe");
    cargo_bin_cmd!("pe-ngram")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(temp.path())
        .args(["--dimension", "5"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn report_flags_without_known_letters_are_rejected() {
    let temp = tempdir().unwrap();
    let input = write_sample(temp.path(), "alt.exe");
    cargo_bin_cmd!("pe-ngram")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(temp.path())
        .args(["--dimension", "1", "--report", "xyz"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("select nothing"));
}

#[test]
fn unknown_region_strategy_names_the_stage() {
    let temp = tempdir().unwrap();
    let input = write_sample(temp.path(), "alt.exe");
    cargo_bin_cmd!("pe-ngram")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(temp.path().join("out"))
        .args(["--dimension", "2", "--region", "everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("region stage failed"))
        .stderr(predicate::str::contains("max-entropy-section, plateaus-in-max-section"));
}

#[test]
fn non_pe_input_fails_in_metadata_stage() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("notes.txt");
    fs::write(&input, "plain text, not a PE image").unwrap();
    cargo_bin_cmd!("pe-ngram")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(temp.path().join("out"))
        .args(["--dimension", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("metadata stage failed"));
}

#[test]
fn config_file_supplies_settings_and_flags_override() {
    let temp = tempdir().unwrap();
    let input = write_sample(temp.path(), "alt.exe");
    let out = temp.path().join("out");
    let config = temp.path().join("run.yaml");
    fs::write(
        &config,
        "dimension: 2\nregion_strategy: plateaus-in-max-section\nring_capacity: 64\nreport:\n  flags: e\n",
    )
    .unwrap();

    let output = cargo_bin_cmd!("pe-ngram")
        .env("GNUPLOT_BIN", NO_PLOTTER)
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&out)
        .arg("--config")
        .arg(&config)
        .args(["--region", "max-entropy-section", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(body["dimension"], 2);
    assert_eq!(body["ring_capacity"], 64);
    assert_eq!(body["region_strategy"], "max-entropy-section");
    assert!(out.join("alt.entropy.txt").is_file());
    assert!(!out.join("alt.ngram.txt").exists());
}

#[test]
fn strategies_lists_builtins() {
    cargo_bin_cmd!("pe-ngram")
        .arg("strategies")
        .assert()
        .success()
        .stdout(predicate::str::contains("- max-entropy-section:"))
        .stdout(predicate::str::contains("- plateaus-in-max-section:"))
        .stdout(predicate::str::contains("- descending-frequency:"));

    let output = cargo_bin_cmd!("pe-ngram")
        .args(["strategies", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(body["region"].as_array().unwrap().len(), 2);
    assert_eq!(body["model"][0]["name"], "descending-frequency");
}

#[test]
fn sections_subcommand_prints_table() {
    let temp = tempdir().unwrap();
    let input = write_sample(temp.path(), "alt.exe");

    cargo_bin_cmd!("pe-ngram")
        .arg("sections")
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sections of alt (2):"))
        .stdout(predicate::str::contains("#0 .text___ chars=0x60000020 offset=0x00000200 size=0x00000200 blocks=2 entropy max=1.000 avg=1.000 min=1.000"))
        .stdout(predicate::str::contains("#1 .bss____"));

    let output = cargo_bin_cmd!("pe-ngram")
        .args(["sections", "--json", "--input"])
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(body[0]["avg_entropy"], 1.0);
    assert!(body[1].get("avg_entropy").is_none());
}
