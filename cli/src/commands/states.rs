//! `kubeboot states` — list the registered steps.

use anyhow::Result;
use serde::Serialize;

use crate::app::AppContext;
use crate::domain::config::KubebootConfig;
use crate::domain::steps::JoinRole;
use crate::output::json;

#[derive(Serialize)]
struct StatesOutput<'a> {
    states: Vec<&'a str>,
}

/// Run the states command.
pub fn run(app: &AppContext) -> Result<()> {
    let registry = app.registry(&KubebootConfig::default(), JoinRole::default());
    let states = registry.names();
    if app.json {
        return json::print(&StatesOutput { states });
    }
    for name in states {
        println!("{name}");
    }
    Ok(())
}
