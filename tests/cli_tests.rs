//! CLI and basic command tests

mod common;

use common::{bimtk, sample_model, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    bimtk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quantity take-off"));
}

#[test]
fn test_version_displays() {
    bimtk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bimtk"));
}

#[test]
fn test_unknown_command_fails() {
    bimtk()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    bimtk()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bimtk"));
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_show_defaults() {
    bimtk()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("grid_size: 0.1"))
        .stdout(predicate::str::contains("max_planes: 6"));
}

#[test]
fn test_config_show_reads_explicit_file() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(&tmp, "bimtk.yaml", "section:\n  max_planes: 2\n");

    bimtk()
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("max_planes: 2"));
}

#[test]
fn test_config_from_env() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(&tmp, "bimtk.yaml", "measurement:\n  precision: 4\n");

    bimtk()
        .env("BIMTK_CONFIG", &config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("precision: 4"));
}

#[test]
fn test_config_path_prints_location() {
    bimtk()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));
}

#[test]
fn test_missing_config_file_fails() {
    bimtk()
        .args(["config", "show", "--config", "/nonexistent/bimtk.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_invalid_config_value_fails() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(&tmp, "bimtk.yaml", "section:\n  max_planes: 0\n");

    bimtk()
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_planes"));
}

#[test]
fn test_config_yaml_syntax_error_reported() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(&tmp, "bimtk.yaml", "section:\n  max_planes: [1,\n");

    bimtk()
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .failure();
}

// ============================================================================
// Input Errors
// ============================================================================

#[test]
fn test_missing_model_fails() {
    bimtk()
        .args(["qty", "list", "/nonexistent/model.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Model not found"));
}

#[test]
fn test_unsupported_model_format_fails() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "model.ifc", "ISO-10303-21;");

    bimtk()
        .args(["qty", "list"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported model format"));
}

#[test]
fn test_invalid_output_format_rejected() {
    let tmp = TempDir::new().unwrap();
    let model = sample_model(&tmp);

    bimtk()
        .args(["qty", "list", "-o", "xml"])
        .arg(&model)
        .assert()
        .failure();
}

#[test]
fn test_verbose_logging_goes_to_stderr() {
    let tmp = TempDir::new().unwrap();
    let model = sample_model(&tmp);

    bimtk()
        .args(["-v", "qty", "list", "--count"])
        .arg(&model)
        .assert()
        .success()
        .stdout("7\n")
        .stderr(predicate::str::contains("quantities extracted"));
}
