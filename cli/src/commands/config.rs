//! `kubeboot config` — show and set configuration values.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;
use crate::domain::config::KubebootConfig;
use crate::output::json;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set configuration value (an empty value clears optional settings)
    Set {
        /// Configuration key, e.g. ssh.host_key_checking
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Serialize)]
struct ConfigOutput<'a> {
    path: String,
    config: &'a KubebootConfig,
}

/// Run the config command.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Set { key, value } => set_config(app, &key, &value),
    }
}

fn show_config(app: &AppContext) -> Result<()> {
    let config = config_service::load_config(&app.config_store)?;
    let path = app.config_store.path()?;
    if app.json {
        return json::print(&ConfigOutput {
            path: path.display().to_string(),
            config: &config,
        });
    }
    app.output.header("Configuration");
    app.output.kv("Path:", &path.display().to_string());
    println!();
    let yaml = serde_yaml::to_string(&config).context("cannot serialize config")?;
    for line in yaml.lines() {
        println!("  {line}");
    }
    Ok(())
}

fn set_config(app: &AppContext, key: &str, value: &str) -> Result<()> {
    config_service::set_value(&app.config_store, key, value)?;
    if value.is_empty() {
        app.output.success(&format!("Cleared {key}"));
    } else {
        app.output.success(&format!("Set {key} = {value}"));
    }
    Ok(())
}
