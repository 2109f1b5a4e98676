//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application` or `tokio`. All error types implement
//! `thiserror::Error` and convert to `anyhow::Error` via the `?` operator.

use thiserror::Error;

// ── Connection errors ─────────────────────────────────────────────────────────

/// Failure to establish the authenticated transport to a node.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(
        "no SSH agent available (SSH_AUTH_SOCK is unset or does not point to a socket). \
         kubeboot authenticates exclusively through the agent: run `ssh-add` first."
    )]
    NoAgent,

    #[error("cannot connect to {node}: {reason}")]
    Dial { node: String, reason: String },

    #[error("authentication to {node} as '{user}' failed: {reason}")]
    Auth {
        node: String,
        user: String,
        reason: String,
    },

    #[error("host key verification failed for {node}: {reason}")]
    HostKey { node: String, reason: String },

    #[error("connection to {node} timed out after {secs}s")]
    Timeout { node: String, secs: u64 },
}

// ── Transport / session errors ───────────────────────────────────────────────

/// Failure to open a session, set up pipes or run the local transport client.
#[derive(Debug, Error)]
#[error("transport failure on {node}: {reason}")]
pub struct TransportError {
    pub node: String,
    pub reason: String,
}

/// A remote command ran but exited non-zero.
#[derive(Debug, Error)]
#[error("remote command `{command}` failed{}{}", exit_suffix(.exit_code), stderr_suffix(.stderr))]
pub struct RemoteCommandError {
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[allow(clippy::ref_option)]
fn exit_suffix(code: &Option<i32>) -> String {
    code.map_or_else(
        || " (terminated by signal)".to_string(),
        |c| format!(" with exit code {c}"),
    )
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

/// Everything that can go wrong while executing one remote command.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Command(#[from] RemoteCommandError),

    #[error("remote command `{command}` timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },

    #[error("remote command `{command}` was cancelled")]
    Cancelled { command: String },
}

/// Failure of a local helper process (the transport client).
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {secs}s")]
    TimedOut { program: String, secs: u64 },

    #[error("{program} was cancelled")]
    Cancelled { program: String },
}

// ── Transfer errors ───────────────────────────────────────────────────────────

/// Errors raised while moving file content to or from a node.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid remote path '{0}': must be absolute and name a file")]
    InvalidPath(String),

    #[error("cannot read local file {path}: {source}")]
    LocalRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode content of {path} downloaded from the node: {reason}")]
    Decode { path: String, reason: String },

    #[error("checksum mismatch after upload to {path}: expected {expected}, node reports {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

// ── Registry / apply errors ───────────────────────────────────────────────────

/// A step name with no registered runner.
#[derive(Debug, Error)]
#[error("state does not exist: {name}")]
pub struct UnknownStateError {
    pub name: String,
}

/// Errors building a step registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("step '{0}' is registered more than once")]
    Duplicate(String),
}

/// Failure of a multi-step apply. Steps before the failing one stay applied.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error(transparent)]
    UnknownState(#[from] UnknownStateError),

    #[error("step '{step}' (#{position}) failed after {completed} completed step(s)")]
    StepFailed {
        step: String,
        position: usize,
        completed: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl ApplyError {
    /// Name of the step that stopped the apply.
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            Self::UnknownState(e) => &e.name,
            Self::StepFailed { step, .. } => step,
        }
    }
}

// ── Input errors ──────────────────────────────────────────────────────────────

/// Errors parsing a node argument such as `10.0.0.5:2222`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeAddressError {
    #[error("node address is empty")]
    Empty,

    #[error("invalid port in node address '{0}'")]
    InvalidPort(String),

    #[error("malformed node address '{0}'")]
    Malformed(String),
}

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
