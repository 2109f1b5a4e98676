//! `kubernetes.upload-secrets`.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::StepContext;
use crate::application::ports::RemoteTarget;
use crate::application::services::registry::Runner;
use crate::domain::steps::{REMOTE_KUBERNETES_DIR, SECRETS};

/// Copies the shared cluster certificates and admin kubeconfig from the local
/// cluster directory to `/etc/kubernetes` on the node.
pub struct UploadSecrets {
    ctx: Arc<StepContext>,
}

impl UploadSecrets {
    #[must_use]
    pub fn new(ctx: Arc<StepContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Runner for UploadSecrets {
    async fn run(&self, target: &dyn RemoteTarget) -> Result<()> {
        for secret in SECRETS {
            let local = self.ctx.cluster_dir.join(secret);
            let remote = format!("{REMOTE_KUBERNETES_DIR}/{secret}");
            let files = self.ctx.files.as_ref();
            let transfer = &self.ctx.transfer;
            let uploaded = if is_private(secret) {
                transfer
                    .upload_private_file(target, files, &local, &remote)
                    .await
            } else {
                transfer.upload_file(target, files, &local, &remote).await
            };
            uploaded.with_context(|| format!("uploading {secret}"))?;
        }
        Ok(())
    }
}

/// Key material and the admin kubeconfig must not be world-readable.
fn is_private(secret: &str) -> bool {
    secret.ends_with(".key") || secret == "admin.conf"
}
