//! `kubeboot init` — bootstrap the first control-plane node.

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::{TargetArgs, run_steps};
use crate::domain::steps::{JoinRole, init_sequence};

/// Run the init command.
pub async fn run(app: &AppContext, args: &TargetArgs) -> Result<()> {
    let config = app.load_config()?;
    let target = app.target(args, &config)?;
    let registry = app.registry(&config, JoinRole::Master);
    run_steps(app, &target, &registry, &init_sequence()).await
}
