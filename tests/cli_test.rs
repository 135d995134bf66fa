//! Tests that run the `seabed2030` binary

use std::{fs, process::Command};
use tempfile::tempdir;

fn seabed2030() -> Command {
    Command::new(env!("CARGO_BIN_EXE_seabed2030"))
}

#[test]
fn test_cli_create_collection() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let destination = temp_dir.path().join("stac").join("collection.json");

    let output = seabed2030()
        .arg("create-collection")
        .arg(&destination)
        .output()
        .expect("Failed to run seabed2030");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Saved collection"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&destination).expect("collection written")).expect("valid JSON");
    assert_eq!(json["id"], "seabed-2030");
    assert_eq!(json["type"], "Collection");
}

#[test]
fn test_cli_create_cog_without_destination() {
    let output = seabed2030()
        .args(["create-cog", "GEBCO.nc"])
        .output()
        .expect("Failed to run seabed2030");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid arguments"), "stderr: {}", stderr);
}

#[test]
fn test_cli_rejects_unknown_command() {
    let output = seabed2030().arg("create-catalog").output().expect("Failed to run seabed2030");
    assert!(!output.status.success());
}
