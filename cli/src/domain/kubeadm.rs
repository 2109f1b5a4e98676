//! Values for the kubeadm/kubelet templates and their rendering.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::domain::config::KubeadmConfig;
use crate::domain::steps::JoinRole;

/// Temporary location of the rendered kubeadm configuration on the node.
pub const REMOTE_KUBEADM_CONFIG: &str = "/tmp/kubeadm.conf";

/// Everything a template may reference.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TemplateValues {
    pub node_name: String,
    pub image_repository: String,
    pub kubernetes_version: String,
    pub control_plane_endpoint: Option<String>,
    pub bootstrap_token: Option<String>,
    pub ca_cert_hash: Option<String>,
    pub role: &'static str,
    pub control_plane: bool,
}

impl TemplateValues {
    #[must_use]
    pub fn new(config: &KubeadmConfig, node_name: &str, role: JoinRole) -> Self {
        Self {
            node_name: node_name.to_string(),
            image_repository: config.image_repository.clone(),
            kubernetes_version: config.kubernetes_version.clone(),
            control_plane_endpoint: config.control_plane_endpoint.clone(),
            bootstrap_token: config.bootstrap_token.clone(),
            ca_cert_hash: config.ca_cert_hash.clone(),
            role: role.as_str(),
            control_plane: role == JoinRole::Master,
        }
    }

    /// Settings `kubeadm join` cannot do without, by config key.
    #[must_use]
    pub fn missing_join_settings(&self) -> Vec<&'static str> {
        [
            ("kubeadm.control_plane_endpoint", &self.control_plane_endpoint),
            ("kubeadm.bootstrap_token", &self.bootstrap_token),
            ("kubeadm.ca_cert_hash", &self.ca_cert_hash),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| k)
        .collect()
    }
}

/// Render `source` with `values`. Undefined variables are errors.
///
/// # Errors
///
/// Returns the template engine error for syntax errors or undefined values.
pub fn render(source: &str, values: &TemplateValues) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.render_str(source, values)
}
