//! Command implementations

pub mod apply;
pub mod config;
pub mod init;
pub mod join;
pub mod states;
pub mod version;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::ports::{CommandRunner, RemoteTarget};
use crate::application::services::apply::apply;
use crate::application::services::registry::StateRegistry;
use crate::infra::ssh::SshTarget;
use crate::output::{TerminalReporter, json};

/// How to reach a node.
#[derive(Args)]
pub struct TargetArgs {
    /// Node to provision: host, host:port or [ipv6]:port
    pub node: String,

    /// User identity used to connect to the node
    #[arg(short, long, default_value = "root")]
    pub user: String,

    /// Run remote commands via sudo
    #[arg(long)]
    pub sudo: bool,
}

/// JSON result of a successful bootstrap.
#[derive(Serialize)]
struct ApplyOutput<'a> {
    node: String,
    applied: &'a [&'a str],
}

/// Apply `names` to `target`, then close its connection whatever the outcome.
async fn run_steps<R: CommandRunner>(
    app: &AppContext,
    target: &SshTarget<R>,
    registry: &StateRegistry,
    names: &[&str],
) -> Result<()> {
    let node = target.node().to_string();
    app.output.header(&format!("Provisioning {node}"));

    let reporter = TerminalReporter::new(&app.output);
    let outcome = apply(registry, target, names, &reporter).await;
    target.disconnect().await;
    outcome?;

    if app.json {
        json::print(&ApplyOutput {
            node,
            applied: names,
        })?;
    } else {
        app.output.provisioned(&node, names);
    }
    Ok(())
}
