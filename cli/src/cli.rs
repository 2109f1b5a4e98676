//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Bootstrap Kubernetes nodes over SSH with kubeadm
#[derive(Parser)]
#[command(
    name = "kubeboot",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log verbosity (overrides KUBEBOOT_LOG)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialise the first control-plane node
    Init(commands::TargetArgs),

    /// Join a node to the cluster
    Join(commands::join::JoinArgs),

    /// Apply named steps to a node
    Apply(commands::apply::ApplyArgs),

    /// List available steps
    States,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            log_level: _,
            command,
        } = self;
        let app = AppContext::new(
            &AppFlags {
                no_color,
                quiet,
                json,
            },
            cancel,
        );
        match command {
            Command::Init(args) => commands::init::run(&app, &args).await,
            Command::Join(args) => commands::join::run(&app, &args).await,
            Command::Apply(args) => commands::apply::run(&app, &args).await,
            Command::States => commands::states::run(&app),
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
