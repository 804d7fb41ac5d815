// ABOUTME: Integration tests for the machine-image CLI.
// ABOUTME: Exercises help output, init, and failures caught before connecting to the bus.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn machine_image_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("machine-image"))
}

#[test]
fn help_shows_commands() {
    machine_image_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn init_creates_manifest() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manifest = temp_dir.path().join("machine-images.yml");

    machine_image_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--name", "alpine"])
        .assert()
        .success();

    let content = fs::read_to_string(&manifest).unwrap();
    assert!(content.contains("name: alpine"));
}

#[test]
fn init_refuses_to_overwrite_existing_manifest() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("machine-images.yml"), "images: []\n").unwrap();

    machine_image_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn apply_without_manifest_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    machine_image_cmd()
        .current_dir(temp_dir.path())
        .arg("apply")
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest not found"));
}

#[test]
fn apply_rejects_invalid_manifest() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("broken.yml");
    fs::write(&path, "images:\n  - name: fedora\n    action: import\n").unwrap();

    machine_image_cmd()
        .arg("apply")
        .arg("--file")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("path"));
}

#[test]
fn clone_onto_itself_is_rejected() {
    machine_image_cmd()
        .args(["clone", "fedora", "fedora"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("distinct"));
}

#[test]
fn invalid_image_name_is_rejected_by_parser() {
    machine_image_cmd()
        .args(["remove", "../etc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn quiet_and_json_conflict() {
    machine_image_cmd()
        .args(["--quiet", "--json", "list"])
        .assert()
        .failure();
}
