//! Integration tests for the devbootstrap binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A command with `HOME` pointed at an empty temp directory.
fn devbootstrap(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("devbootstrap"));
    cmd.env("HOME", home.path())
        .env("CI", "true")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(home: &TempDir, content: &str) {
    let dir = home.path().join(".devbootstrap");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.yml"), content).unwrap();
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    devbootstrap(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install and remove developer tools"))
        .stdout(predicate::str::contains("uninstall"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    devbootstrap(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn list_json_is_the_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let output = devbootstrap(&home).args(["list", "--json"]).output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|app| app["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        ["docker", "vscode", "neovim", "neovim-config", "zsh", "oh-my-zsh", "nerd-font"]
    );
    Ok(())
}

#[test]
fn install_without_ids_in_non_interactive_mode_is_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    devbootstrap(&home)
        .args(["install", "-n"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No applications given"));
    Ok(())
}

#[test]
fn unknown_application_fails_the_batch() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    devbootstrap(&home)
        .args(["install", "emacs", "-n"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown application: emacs"));
    Ok(())
}

#[test]
fn dry_run_neovim_config_changes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    // Fails on hosts without nvim; either way nothing may be written.
    devbootstrap(&home)
        .args(["install", "neovim-config", "--dry-run", "-n"])
        .output()?;
    assert!(!home.path().join(".config/nvim").exists());
    Ok(())
}

#[test]
fn malformed_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    write_config(&home, "settings: [not, a, map]\n");
    devbootstrap(&home)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}

#[test]
fn missing_explicit_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    devbootstrap(&home)
        .args(["list", "--config"])
        .arg(home.path().join("nope.yml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("file not found"));
    Ok(())
}

#[test]
fn completions_for_bash() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    devbootstrap(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("devbootstrap"));
    Ok(())
}
