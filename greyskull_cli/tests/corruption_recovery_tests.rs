//! Corruption recovery tests for the greyskull binary.
//!
//! These tests verify the system can handle:
//! - Corrupted user files
//! - A dangling or empty current-user pointer
//! - Malformed config and program files

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("greyskull"));
    cmd.arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .arg("--config")
        .arg(temp_dir.path().join("config.toml"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn users_dir(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("data").join("users")
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).expect("Failed to write file");
}

#[test]
fn test_corrupted_current_user_file_is_reported() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["user", "create", "Alice"])
        .assert()
        .success();
    write(&users_dir(&temp_dir).join("alice.json"), "{ invalid json }}}}");

    cli(&temp_dir)
        .args(["workout", "next"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));
}

#[test]
fn test_corrupted_user_skipped_in_list() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["user", "create", "Alice"])
        .assert()
        .success();
    write(&users_dir(&temp_dir).join("mallory.json"), "not json at all");

    cli(&temp_dir)
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* Alice (current)"))
        .stdout(predicate::str::contains("mallory").not());
}

#[test]
fn test_deleted_current_user() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["user", "create", "Alice"])
        .assert()
        .success();
    fs::remove_file(users_dir(&temp_dir).join("alice.json")).unwrap();

    cli(&temp_dir)
        .args(["workout", "next"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no current user set"));
}

#[test]
fn test_empty_current_user_pointer() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["user", "create", "Alice"])
        .assert()
        .success();
    write(&temp_dir.path().join("data/current_user.txt"), "  \n");

    cli(&temp_dir)
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  Alice\n"))
        .stdout(predicate::str::contains("(current)").not());

    // Switching repairs the pointer
    cli(&temp_dir)
        .args(["user", "switch", "alice"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("data/current_user.txt")).unwrap(),
        "Alice"
    );
}

#[test]
fn test_missing_data_directory_is_created() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found"));

    assert!(users_dir(&temp_dir).is_dir());
}

#[test]
fn test_malformed_config_is_error() {
    let temp_dir = setup_test_dir();
    write(&temp_dir.path().join("config.toml"), "[data\ndata_dir = ");

    cli(&temp_dir)
        .args(["user", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}

#[test]
fn test_invalid_custom_program_is_rejected() {
    let temp_dir = setup_test_dir();
    let program_path = temp_dir.path().join("broken.json");

    let broken = serde_json::json!({
        "id": "00000000-0000-0000-0000-000000000009",
        "name": "No AMRAP",
        "version": "0.1.0",
        "workouts": [{
            "day": 1,
            "lifts": [{
                "lift": "squat",
                "warmup_sets": [],
                "working_sets": [
                    {"reps": 5, "weight_percentage": 1.0, "kind": "working"}
                ]
            }]
        }],
        "progression_rules": {
            "increments": {"squat": 5.0},
            "deload_fraction": 0.9,
            "double_threshold": 10
        }
    });
    write(&program_path, &broken.to_string());
    write(
        &temp_dir.path().join("config.toml"),
        &format!("[program]\ncustom_program = {:?}\n", program_path),
    );

    cli(&temp_dir)
        .args(["program", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected exactly one AMRAP set"));
}
