//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{
    CommandResult, KubebootConfig, NodeAddress, ProcessError, RemoteCommand,
    RemoteError,
};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts local process execution so the transport can be swapped or mocked.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion, optionally feeding `input` on stdin, and
    /// capture both output streams.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned, exceeds `timeout`,
    /// or is cancelled. In the last two cases the child must be killed.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        input: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<CommandResult, ProcessError>;
}

// ── Remote Target Port ────────────────────────────────────────────────────────

/// A reachable node: runs commands over an owned, lazily established connection.
#[async_trait]
pub trait RemoteTarget: Send + Sync {
    /// Address of the node.
    fn node(&self) -> &NodeAddress;

    /// Run `command` in a fresh session and return its output whatever the
    /// exit code.
    ///
    /// # Errors
    ///
    /// Returns an error on connection, session or timeout failures.
    async fn run(
        &self,
        command: &RemoteCommand,
        input: Option<&[u8]>,
    ) -> Result<CommandResult, RemoteError>;

    /// Run `command`; a non-zero exit is a [`RemoteError::Command`].
    ///
    /// # Errors
    ///
    /// As [`RemoteTarget::run`], plus non-zero remote exit.
    async fn execute(&self, command: &RemoteCommand) -> Result<CommandResult, RemoteError> {
        let result = self.run(command, None).await?;
        Ok(result.check(&command.to_shell())?)
    }

    /// Run `command` with `input` piped to its standard input.
    ///
    /// # Errors
    ///
    /// As [`RemoteTarget::execute`].
    async fn execute_with_stdin(
        &self,
        command: &RemoteCommand,
        input: &[u8],
    ) -> Result<CommandResult, RemoteError> {
        let result = self.run(command, Some(input)).await?;
        Ok(result.check(&command.to_shell())?)
    }
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a failure message for the step that was in progress.
    fn failure(&self, message: &str);
}

// ── Asset and Filesystem Ports ────────────────────────────────────────────────

/// Read-only access to the unit files and templates installed on nodes.
pub trait AssetStore: Send + Sync {
    /// Text of the asset called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no such asset exists.
    fn asset(&self, name: &str) -> Result<String>;
}

/// Local filesystem reads (cluster secrets).
pub trait LocalFiles: Send + Sync {
    /// Read the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<KubebootConfig>;

    /// Persist configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &KubebootConfig) -> Result<()>;

    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
