//! Top-level CLI behaviour: help, version and the step listing.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn kubeboot() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("kubeboot"))
}

const STEPS: &[&str] = &[
    "cni.deploy",
    "kubeadm.init",
    "kubeadm.join",
    "kubelet.configure",
    "kubelet.enable",
    "kubernetes.upload-secrets",
];

#[test]
fn test_no_args_prints_help_and_fails() {
    kubeboot()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_help_lists_subcommands() {
    let output = kubeboot().arg("--help").output().unwrap();
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for sub in ["init", "join", "apply", "states", "config", "version"] {
        assert!(help.contains(sub), "help is missing {sub}: {help}");
    }
}

#[test]
fn test_version_prints_crate_version() {
    kubeboot()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_json() {
    let output = kubeboot().args(["version", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_states_lists_every_step_sorted() {
    let output = kubeboot().arg("states").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let listed: Vec<&str> = stdout.lines().collect();
    assert_eq!(listed, STEPS);
}

#[test]
fn test_states_json() {
    let output = kubeboot().args(["states", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let states: Vec<&str> = value["states"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(states, STEPS);
}

#[test]
fn test_join_requires_role() {
    kubeboot()
        .args(["join", "10.0.0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--role"));
}

#[test]
fn test_join_rejects_unknown_role() {
    kubeboot()
        .args(["join", "10.0.0.5", "--role", "etcd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid role provided"));
}

#[test]
fn test_apply_requires_at_least_one_step() {
    kubeboot()
        .args(["apply", "10.0.0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("STATES"));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    kubeboot()
        .args(["--log-level", "loud", "states"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loud"));
}
