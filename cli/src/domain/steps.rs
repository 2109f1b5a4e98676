//! Step names and bootstrap sequences.
//!
//! Step names are a stable contract between the command layer and the step
//! registry; they are also accepted verbatim by `kubeboot apply`.

use std::fmt;
use std::str::FromStr;

pub const CNI_DEPLOY: &str = "cni.deploy";
pub const KUBEADM_INIT: &str = "kubeadm.init";
pub const KUBEADM_JOIN: &str = "kubeadm.join";
pub const KUBELET_CONFIGURE: &str = "kubelet.configure";
pub const KUBELET_ENABLE: &str = "kubelet.enable";
pub const KUBERNETES_UPLOAD_SECRETS: &str = "kubernetes.upload-secrets";

/// Every built-in step, sorted.
pub const ALL_STEPS: &[&str] = &[
    CNI_DEPLOY,
    KUBEADM_INIT,
    KUBEADM_JOIN,
    KUBELET_CONFIGURE,
    KUBELET_ENABLE,
    KUBERNETES_UPLOAD_SECRETS,
];

/// Cluster files shared by every control-plane node, relative to the local
/// cluster directory and to `/etc/kubernetes` on the node.
pub const SECRETS: &[&str] = &[
    "pki/ca.crt",
    "pki/ca.key",
    "pki/sa.key",
    "pki/sa.pub",
    "pki/front-proxy-ca.crt",
    "pki/front-proxy-ca.key",
    "pki/etcd/ca.crt",
    "pki/etcd/ca.key",
    "admin.conf",
];

/// Destination root for [`SECRETS`] on the node.
pub const REMOTE_KUBERNETES_DIR: &str = "/etc/kubernetes";

/// Role a joining node takes in the cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinRole {
    Master,
    #[default]
    Worker,
}

impl JoinRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Worker => "worker",
        }
    }
}

impl fmt::Display for JoinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role given to `--role`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid role provided: {0:?}, 'master' or 'worker' are the only accepted roles")]
pub struct InvalidRole(pub String);

impl FromStr for JoinRole {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Self::Master),
            "worker" => Ok(Self::Worker),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

/// Steps run by `kubeboot init` on the first control-plane node.
#[must_use]
pub fn init_sequence() -> Vec<&'static str> {
    vec![
        KUBERNETES_UPLOAD_SECRETS,
        KUBELET_CONFIGURE,
        KUBELET_ENABLE,
        KUBEADM_INIT,
        CNI_DEPLOY,
    ]
}

/// Steps run by `kubeboot join` for the given role.
#[must_use]
pub fn join_sequence(role: JoinRole) -> Vec<&'static str> {
    let mut steps = Vec::with_capacity(4);
    if role == JoinRole::Master {
        steps.push(KUBERNETES_UPLOAD_SECRETS);
    }
    steps.extend([KUBELET_CONFIGURE, KUBELET_ENABLE, KUBEADM_JOIN]);
    steps
}
