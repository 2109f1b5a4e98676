//! Integration tests for `kubeboot config` command.
//!
//! All filesystem-touching tests set `KUBEBOOT_CONFIG` to a temp path so they
//! never read or write `~/.kubeboot/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kubeboot() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("kubeboot"))
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

fn config_cmd(path: &str) -> Command {
    let mut cmd = kubeboot();
    cmd.env("KUBEBOOT_CONFIG", path).arg("config");
    cmd
}

// ---------------------------------------------------------------------------
// Subcommand registration
// ---------------------------------------------------------------------------

#[test]
fn test_config_help_shows_show_and_set_subcommands() {
    kubeboot()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"));
}

// ---------------------------------------------------------------------------
// config show
// ---------------------------------------------------------------------------

#[test]
fn test_config_show_without_file_prints_defaults() {
    let (_dir, path) = temp_config_path();
    config_cmd(&path)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains(path.as_str()))
        .stdout(predicate::str::contains("host_key_checking: accept-new"))
        .stdout(predicate::str::contains("kubernetes_version: stable-1"));
}

#[test]
fn test_config_show_json_has_path_and_config() {
    let (_dir, path) = temp_config_path();
    let output = config_cmd(&path).args(["show", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["path"], path.as_str());
    assert_eq!(value["config"]["ssh"]["port"], 22);
    assert_eq!(value["config"]["transfer"]["verify_checksum"], true);
}

#[test]
fn test_config_show_reports_unparseable_file() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "ssh: [not, a, mapping]\n").unwrap();
    config_cmd(&path)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse"));
}

// ---------------------------------------------------------------------------
// config set
// ---------------------------------------------------------------------------

#[test]
fn test_config_set_persists_value() {
    let (_dir, path) = temp_config_path();
    config_cmd(&path)
        .args(["set", "ssh.host_key_checking", "strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set ssh.host_key_checking = strict"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("host_key_checking: strict"), "{content}");

    config_cmd(&path)
        .args(["show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"strict\""));
}

#[cfg(unix)]
#[test]
fn test_config_set_writes_private_file() {
    use std::os::unix::fs::PermissionsExt;
    let (_dir, path) = temp_config_path();
    config_cmd(&path)
        .args(["set", "ssh.port", "2222"])
        .assert()
        .success();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[test]
fn test_config_set_keeps_other_values() {
    let (_dir, path) = temp_config_path();
    config_cmd(&path)
        .args(["set", "ssh.port", "2222"])
        .assert()
        .success();
    config_cmd(&path)
        .args(["set", "kubeadm.container_runtime", "containerd"])
        .assert()
        .success();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("port: 2222"));
    assert!(content.contains("container_runtime: containerd"));
}

#[test]
fn test_config_set_empty_value_clears_optional_setting() {
    let (_dir, path) = temp_config_path();
    config_cmd(&path)
        .args(["set", "kubeadm.control_plane_endpoint", "10.0.0.1:6443"])
        .assert()
        .success();
    config_cmd(&path)
        .args(["set", "kubeadm.control_plane_endpoint", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared kubeadm.control_plane_endpoint"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.contains("control_plane_endpoint"), "{content}");
}

#[test]
fn test_config_set_unknown_key_lists_valid_keys() {
    let (_dir, path) = temp_config_path();
    config_cmd(&path)
        .args(["set", "ssh.cipher", "aes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting: ssh.cipher"))
        .stderr(predicate::str::contains("ssh.host_key_checking"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_rejects_malformed_bootstrap_token() {
    let (_dir, path) = temp_config_path();
    config_cmd(&path)
        .args(["set", "kubeadm.bootstrap_token", "not-a-token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for kubeadm.bootstrap_token"));
}

#[test]
fn test_config_set_invalid_value_json_error() {
    let (_dir, path) = temp_config_path();
    let output = config_cmd(&path)
        .args(["set", "ssh.port", "0", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "invalid_config");
}
