//! Tests for `kubeadm.init` and `kubeadm.join`.

#![allow(clippy::unwrap_used)]

use kubeboot_cli::application::services::registry::Runner;
use kubeboot_cli::application::services::steps::{KubeadmInit, KubeadmJoin};
use kubeboot_cli::domain::KubebootConfig;
use kubeboot_cli::domain::steps::JoinRole;

use crate::helpers::{FakeNode, join_ready_config, step_context};

const CONFIG_PATH: &str = "/tmp/kubeadm.conf";

/// Commands other than the upload plumbing.
fn significant(node: &FakeNode) -> Vec<String> {
    node.commands()
        .into_iter()
        .filter(|c| !c.starts_with("mkdir") && !c.starts_with("base64") && !c.starts_with("sha256sum"))
        .collect()
}

// ---------------------------------------------------------------------------
// kubeadm.init
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_init_uploads_config_then_runs_kubeadm_and_cleans_up() {
    let node = FakeNode::new();
    KubeadmInit::new(step_context(&KubebootConfig::default(), JoinRole::Worker))
        .run(&node)
        .await
        .unwrap();

    assert_eq!(
        significant(&node),
        [
            "systemctl enable --now docker",
            "systemctl stop kubelet",
            "kubeadm init --config /tmp/kubeadm.conf --skip-token-print",
            "rm -f /tmp/kubeadm.conf",
        ]
    );
    let uploaded = node.file_text(CONFIG_PATH).unwrap();
    assert!(uploaded.contains("kind: InitConfiguration"));
    assert!(uploaded.contains("name: node-1"));
    assert!(uploaded.contains("kubernetesVersion: stable-1"));
    assert!(uploaded.contains("imageRepository: registry.k8s.io"));
    assert!(!uploaded.contains("controlPlaneEndpoint"));
}

#[tokio::test]
async fn test_init_includes_control_plane_endpoint_when_set() {
    let mut config = KubebootConfig::default();
    config.kubeadm.control_plane_endpoint = Some("lb.example:6443".to_string());
    config.kubeadm.container_runtime = "containerd".to_string();
    let node = FakeNode::new();
    KubeadmInit::new(step_context(&config, JoinRole::Worker))
        .run(&node)
        .await
        .unwrap();

    let uploaded = node.file_text(CONFIG_PATH).unwrap();
    assert!(uploaded.contains("controlPlaneEndpoint: lb.example:6443"));
    assert!(node.commands().contains(&"systemctl enable --now containerd".to_string()));
}

#[tokio::test]
async fn test_init_removes_config_even_when_kubeadm_fails() {
    let node = FakeNode::new().failing_on("kubeadm init");
    let err = KubeadmInit::new(step_context(&KubebootConfig::default(), JoinRole::Worker))
        .run(&node)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("kubeadm init"));
    assert_eq!(
        node.commands().last().map(String::as_str),
        Some("rm -f /tmp/kubeadm.conf")
    );
}

#[tokio::test]
async fn test_init_stops_before_kubeadm_when_runtime_fails() {
    let node = FakeNode::new().failing_on("enable --now");
    KubeadmInit::new(step_context(&KubebootConfig::default(), JoinRole::Worker))
        .run(&node)
        .await
        .unwrap_err();

    let commands = node.commands();
    assert!(!commands.iter().any(|c| c.starts_with("kubeadm")));
    assert_eq!(commands.last().map(String::as_str), Some("rm -f /tmp/kubeadm.conf"));
}

// ---------------------------------------------------------------------------
// kubeadm.join
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_join_worker_renders_discovery_without_control_plane() {
    let node = FakeNode::new();
    KubeadmJoin::new(step_context(&join_ready_config(), JoinRole::Worker))
        .run(&node)
        .await
        .unwrap();

    assert!(
        significant(&node).contains(&"kubeadm join --config /tmp/kubeadm.conf".to_string())
    );
    let uploaded = node.file_text(CONFIG_PATH).unwrap();
    assert!(uploaded.contains("kind: JoinConfiguration"));
    assert!(uploaded.contains("apiServerEndpoint: 10.0.0.1:6443"));
    assert!(uploaded.contains("token: abcdef.0123456789abcdef"));
    assert!(uploaded.contains(&format!("- sha256:{}", "a".repeat(64))));
    assert!(!uploaded.contains("controlPlane:"));
}

#[tokio::test]
async fn test_join_master_adds_control_plane_section() {
    let node = FakeNode::new();
    KubeadmJoin::new(step_context(&join_ready_config(), JoinRole::Master))
        .run(&node)
        .await
        .unwrap();
    assert!(node.file_text(CONFIG_PATH).unwrap().contains("controlPlane: {}"));
}

#[tokio::test]
async fn test_join_without_settings_fails_before_touching_node() {
    let node = FakeNode::new();
    let err = KubeadmJoin::new(step_context(&KubebootConfig::default(), JoinRole::Worker))
        .run(&node)
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("kubeadm.control_plane_endpoint"));
    assert!(message.contains("kubeadm.bootstrap_token"));
    assert!(message.contains("kubeadm.ca_cert_hash"));
    assert!(message.contains("kubeboot config set"));
    assert!(node.commands().is_empty());
}

#[tokio::test]
async fn test_join_names_only_the_missing_setting() {
    let mut config = join_ready_config();
    config.kubeadm.bootstrap_token = None;
    let err = KubeadmJoin::new(step_context(&config, JoinRole::Worker))
        .run(&FakeNode::new())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("kubeadm.bootstrap_token"));
    assert!(!message.contains("kubeadm.ca_cert_hash"));
}
