//! `kubelet.configure` and `kubelet.enable`.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::StepContext;
use crate::application::ports::RemoteTarget;
use crate::application::services::registry::Runner;
use crate::domain::os_release::OS_RELEASE_PATH;
use crate::domain::{OsRelease, RemoteCommand};

const SERVICE_ASSET: &str = "kubelet.service";
const DROPIN_ASSET: &str = "10-kubeadm.conf.j2";
const SYSCONFIG_ASSET: &str = "kubelet.sysconfig";

/// Where the kubelet files go on one family of distributions.
struct Layout {
    service: &'static str,
    dropin: &'static str,
    sysconfig: Option<&'static str>,
}

const SUSE_LAYOUT: Layout = Layout {
    service: "/usr/lib/systemd/system/kubelet.service",
    dropin: "/usr/lib/systemd/system/kubelet.service.d/10-kubeadm.conf",
    sysconfig: Some("/etc/sysconfig/kubelet"),
};

const DEFAULT_LAYOUT: Layout = Layout {
    service: "/lib/systemd/system/kubelet.service",
    dropin: "/etc/systemd/system/kubelet.service.d/10-kubeadm.conf",
    sysconfig: None,
};

/// Installs the kubelet unit, its kubeadm drop-in and (on SUSE-like nodes)
/// the sysconfig file, then reloads systemd.
pub struct KubeletConfigure {
    ctx: Arc<StepContext>,
}

impl KubeletConfigure {
    #[must_use]
    pub fn new(ctx: Arc<StepContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Runner for KubeletConfigure {
    async fn run(&self, target: &dyn RemoteTarget) -> Result<()> {
        let os_release = target
            .execute(&RemoteCommand::new("cat").arg(OS_RELEASE_PATH))
            .await
            .context("reading os-release")?;
        let os_release = OsRelease::parse(&os_release.stdout);
        let layout = if os_release.is_suse_like() {
            &SUSE_LAYOUT
        } else {
            &DEFAULT_LAYOUT
        };
        tracing::debug!(
            node = %target.node(),
            id_like = os_release.get("ID_LIKE").unwrap_or_default(),
            service = layout.service,
            "selected kubelet layout"
        );

        let service = self.ctx.assets.asset(SERVICE_ASSET)?;
        let dropin = self
            .ctx
            .render(DROPIN_ASSET, target.node().host(), self.ctx.role)?;
        let transfer = &self.ctx.transfer;
        transfer
            .upload(target, service.as_bytes(), layout.service)
            .await?;
        transfer.upload(target, dropin.as_bytes(), layout.dropin).await?;
        if let Some(path) = layout.sysconfig {
            let sysconfig = self.ctx.assets.asset(SYSCONFIG_ASSET)?;
            transfer.upload(target, sysconfig.as_bytes(), path).await?;
        }

        target
            .execute(&RemoteCommand::new("systemctl").arg("daemon-reload"))
            .await?;
        Ok(())
    }
}

/// `systemctl enable kubelet`.
pub struct KubeletEnable;

#[async_trait]
impl Runner for KubeletEnable {
    async fn run(&self, target: &dyn RemoteTarget) -> Result<()> {
        target
            .execute(&RemoteCommand::new("systemctl").args(["enable", "kubelet"]))
            .await?;
        Ok(())
    }
}
