//! `kubeboot apply` — run named steps against a node.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::commands::{TargetArgs, run_steps};
use crate::domain::steps::JoinRole;

/// Arguments for the apply command.
#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Role used by `kubeadm.join` (master|worker)
    #[arg(long, default_value = "worker")]
    pub role: JoinRole,

    /// Steps to apply, in order (see `kubeboot states`)
    #[arg(required = true, num_args = 1..)]
    pub states: Vec<String>,
}

/// Run the apply command.
pub async fn run(app: &AppContext, args: &ApplyArgs) -> Result<()> {
    let config = app.load_config()?;
    let registry = app.registry(&config, args.role);
    let target = app.target(&args.target, &config)?;
    let names: Vec<&str> = args.states.iter().map(String::as_str).collect();
    run_steps(app, &target, &registry, &names).await
}
