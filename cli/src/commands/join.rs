//! `kubeboot join` — add a master or worker node.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::commands::{TargetArgs, run_steps};
use crate::domain::steps::{JoinRole, join_sequence};

/// Arguments for the join command.
#[derive(Args)]
pub struct JoinArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Role this node will have in the cluster (master|worker)
    #[arg(long)]
    pub role: JoinRole,
}

/// Run the join command.
pub async fn run(app: &AppContext, args: &JoinArgs) -> Result<()> {
    let config = app.load_config()?;
    let target = app.target(&args.target, &config)?;
    let registry = app.registry(&config, args.role);
    run_steps(app, &target, &registry, &join_sequence(args.role)).await
}
