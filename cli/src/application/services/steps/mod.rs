//! Built-in provisioning steps.

mod cni;
mod kubeadm;
mod kubelet;
mod secrets;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::{AssetStore, LocalFiles};
use crate::application::services::transfer::FileTransfer;
use crate::domain::config::{KubebootConfig, KubeadmConfig};
use crate::domain::kubeadm::{TemplateValues, render};
use crate::domain::steps::JoinRole;

pub use cni::CniDeploy;
pub use kubeadm::{KubeadmInit, KubeadmJoin};
pub use kubelet::{KubeletConfigure, KubeletEnable};
pub use secrets::UploadSecrets;

/// Shared inputs of the built-in steps.
pub struct StepContext {
    pub kubeadm: KubeadmConfig,
    /// Role `kubeadm.join` joins the node as.
    pub role: JoinRole,
    /// Local directory holding `pki/` and `admin.conf`.
    pub cluster_dir: PathBuf,
    pub transfer: FileTransfer,
    pub assets: Arc<dyn AssetStore>,
    pub files: Arc<dyn LocalFiles>,
}

impl StepContext {
    #[must_use]
    pub fn new(
        config: &KubebootConfig,
        role: JoinRole,
        assets: Arc<dyn AssetStore>,
        files: Arc<dyn LocalFiles>,
    ) -> Self {
        Self {
            kubeadm: config.kubeadm.clone(),
            role,
            cluster_dir: config.cluster.dir.clone(),
            transfer: FileTransfer::new(config.transfer.verify_checksum),
            assets,
            files,
        }
    }

    /// Render the template asset `name` for `node_name`.
    fn render(&self, name: &str, node_name: &str, role: JoinRole) -> Result<String> {
        let source = self.assets.asset(name)?;
        let values = TemplateValues::new(&self.kubeadm, node_name, role);
        render(&source, &values).with_context(|| format!("rendering {name}"))
    }
}
