use async_trait::async_trait;

use crate::application::ports::RemoteTarget;
use crate::application::services::registry::Runner;

/// Network plugin deployment. The plugin is installed from the workstation
/// against the API server, so nothing runs on the node.
pub struct CniDeploy;

#[async_trait]
impl Runner for CniDeploy {
    async fn run(&self, target: &dyn RemoteTarget) -> anyhow::Result<()> {
        tracing::debug!(node = %target.node(), "no node-side action for cni.deploy");
        Ok(())
    }
}
