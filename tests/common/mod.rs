//! Shared test helpers for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a bimtk command isolated from any user configuration
pub fn bimtk() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("bimtk"));
    cmd.env_remove("BIMTK_CONFIG")
        .env_remove("RUST_LOG")
        .env(
            "XDG_CONFIG_HOME",
            std::env::temp_dir().join("bimtk-tests-no-config"),
        );
    cmd
}

/// A small building: two walls, a slab, two identical doors, a window with
/// explicit quantities and an element of an unmapped type
pub const SAMPLE_MODEL: &str = r#"{
  "name": "Test House",
  "description": "Integration test model",
  "elements": [
    {
      "express_id": 1,
      "type": "IFCWALL",
      "name": "Wall A",
      "properties": { "Material": "Brick", "Phase": "New" },
      "geometry": { "vertices": [0, 0, 0, 4, 0.2, 3], "indices": [0, 1, 0] }
    },
    {
      "express_id": 2,
      "type": "IFCWALL",
      "name": "Wall B",
      "properties": { "Material": "Brick" },
      "geometry": { "vertices": [0, 0, 0, 4, 0.2, 3], "indices": [0, 1, 0] }
    },
    {
      "express_id": 3,
      "type": "IFCSLAB",
      "name": "Slab",
      "properties": { "MaterialName": "Concrete" },
      "geometry": { "vertices": [0, 0, 0, 5, 4, 0.25], "indices": [0, 1, 0] }
    },
    { "express_id": 4, "type": "IFCDOOR", "name": "Door" },
    { "express_id": 5, "type": "IFCDOOR", "name": "Door" },
    {
      "express_id": 6,
      "type": "IFCWINDOW",
      "name": "Window, large",
      "quantities": { "area": 2.4 }
    },
    { "express_id": 7, "type": "IFCBUILDINGELEMENTPROXY" }
  ]
}"#;

/// Write a file into the temp dir and return its path
pub fn write_file(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = tmp.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Write the sample model and return its path
pub fn sample_model(tmp: &TempDir) -> PathBuf {
    write_file(tmp, "model.json", SAMPLE_MODEL)
}

/// Run a command and parse stdout as JSON
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
