//! Application context — unified state passed to every command handler.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::application::services::config_service;
use crate::application::services::registry::StateRegistry;
use crate::application::services::steps::StepContext;
use crate::commands::TargetArgs;
use crate::domain::config::KubebootConfig;
use crate::domain::node::NodeAddress;
use crate::domain::steps::JoinRole;
use crate::domain::Elevation;
use crate::infra::assets::EmbeddedAssets;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::LocalFs;
use crate::infra::ssh::{KnownHostsManager, SshSettings, SshTarget};
use crate::output::OutputContext;

/// Environment variable pointing at the SSH agent socket.
pub const AGENT_ENV: &str = "SSH_AUTH_SOCK";

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Machine-readable output requested.
    pub json: bool,
    pub config_store: YamlConfigStore,
    /// Cancelled on Ctrl-C; kills in-flight remote commands.
    pub cancel: CancellationToken,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags, cancel: CancellationToken) -> Self {
        // Progress lines would corrupt JSON on stdout.
        let quiet = flags.quiet || flags.json;
        Self {
            output: OutputContext::new(flags.no_color, quiet),
            json: flags.json,
            config_store: YamlConfigStore::new(),
            cancel,
        }
    }

    /// Load the configuration file, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_config(&self) -> Result<KubebootConfig> {
        config_service::load_config(&self.config_store)
    }

    /// Build the ssh target for `args`.
    ///
    /// # Errors
    ///
    /// Returns an error if the node address is invalid or the home directory
    /// cannot be determined.
    pub fn target(
        &self,
        args: &TargetArgs,
        config: &KubebootConfig,
    ) -> Result<SshTarget<TokioCommandRunner>> {
        let node = NodeAddress::parse_with_default(&args.node, config.ssh.port)
            .with_context(|| format!("invalid node '{}'", args.node))?;
        let agent = std::env::var_os(AGENT_ENV).map(PathBuf::from);
        let settings = SshSettings::new(
            args.user.clone(),
            agent,
            KnownHostsManager::default_path()?,
            &config.ssh,
        );
        Ok(SshTarget::new(
            node,
            settings,
            Elevation::from_sudo_flag(args.sudo),
            TokioCommandRunner::new(self.cancel.clone()),
        ))
    }

    /// The built-in steps configured from `config`.
    #[must_use]
    pub fn registry(&self, config: &KubebootConfig, role: JoinRole) -> StateRegistry {
        let ctx = StepContext::new(config, role, Arc::new(EmbeddedAssets), Arc::new(LocalFs));
        StateRegistry::builtin(Arc::new(ctx))
    }
}
