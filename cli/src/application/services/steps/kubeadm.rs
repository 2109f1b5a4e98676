//! `kubeadm.init` and `kubeadm.join`.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::StepContext;
use crate::application::ports::RemoteTarget;
use crate::application::services::registry::Runner;
use crate::domain::kubeadm::{REMOTE_KUBEADM_CONFIG, TemplateValues};
use crate::domain::steps::JoinRole;
use crate::domain::RemoteCommand;

const INIT_TEMPLATE: &str = "kubeadm-init.yaml.j2";
const JOIN_TEMPLATE: &str = "kubeadm-join.yaml.j2";

/// Initialises the first control-plane node.
pub struct KubeadmInit {
    ctx: Arc<StepContext>,
}

impl KubeadmInit {
    #[must_use]
    pub fn new(ctx: Arc<StepContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Runner for KubeadmInit {
    async fn run(&self, target: &dyn RemoteTarget) -> Result<()> {
        let config = self
            .ctx
            .render(INIT_TEMPLATE, target.node().host(), JoinRole::Master)?;
        let init = RemoteCommand::new("kubeadm").args([
            "init",
            "--config",
            REMOTE_KUBEADM_CONFIG,
            "--skip-token-print",
        ]);
        run_kubeadm(&self.ctx, target, &config, &init).await
    }
}

/// Joins a node to an existing cluster with the configured role.
pub struct KubeadmJoin {
    ctx: Arc<StepContext>,
}

impl KubeadmJoin {
    #[must_use]
    pub fn new(ctx: Arc<StepContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Runner for KubeadmJoin {
    async fn run(&self, target: &dyn RemoteTarget) -> Result<()> {
        let node_name = target.node().host();
        let missing = TemplateValues::new(&self.ctx.kubeadm, node_name, self.ctx.role)
            .missing_join_settings();
        if !missing.is_empty() {
            anyhow::bail!(
                "kubeadm join needs {}; set them with `kubeboot config set <key> <value>`",
                missing.join(", ")
            );
        }
        let config = self.ctx.render(JOIN_TEMPLATE, node_name, self.ctx.role)?;
        let join = RemoteCommand::new("kubeadm").args(["join", "--config", REMOTE_KUBEADM_CONFIG]);
        run_kubeadm(&self.ctx, target, &config, &join).await
    }
}

/// Upload `config`, start the runtime, run `kubeadm` and always remove the
/// uploaded configuration. The first failure is returned.
async fn run_kubeadm(
    ctx: &StepContext,
    target: &dyn RemoteTarget,
    config: &str,
    kubeadm: &RemoteCommand,
) -> Result<()> {
    let outcome = async {
        ctx.transfer
            .upload(target, config.as_bytes(), REMOTE_KUBEADM_CONFIG)
            .await
            .context("uploading kubeadm configuration")?;
        target
            .execute(
                &RemoteCommand::new("systemctl").args([
                    "enable",
                    "--now",
                    ctx.kubeadm.container_runtime.as_str(),
                ]),
            )
            .await?;
        target
            .execute(&RemoteCommand::new("systemctl").args(["stop", "kubelet"]))
            .await?;
        target.execute(kubeadm).await?;
        Ok::<(), anyhow::Error>(())
    }
    .await;

    let cleanup = target
        .execute(&RemoteCommand::new("rm").args(["-f", REMOTE_KUBEADM_CONFIG]))
        .await;
    outcome?;
    cleanup.context("removing kubeadm configuration")?;
    Ok(())
}
