//! `RemoteTarget` over an OpenSSH master connection.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::{CommandRunner, RemoteTarget};
use crate::domain::{
    CommandResult, ConnectionError, Elevation, NodeAddress, ProcessError, RemoteCommand,
    RemoteError, TransportError,
};
use crate::infra::ssh::connection::{SshConnection, SshSettings};

/// ssh reserves this exit status for its own failures.
const SSH_FAILURE_EXIT: i32 = 255;

/// One node reached over ssh. Owns at most one live connection, established
/// on first use and reused until [`SshTarget::invalidate`] or
/// [`SshTarget::disconnect`].
pub struct SshTarget<R: CommandRunner> {
    node: NodeAddress,
    settings: SshSettings,
    elevation: Elevation,
    runner: R,
    connection: Mutex<Option<Arc<SshConnection>>>,
}

impl<R: CommandRunner> SshTarget<R> {
    #[must_use]
    pub fn new(node: NodeAddress, settings: SshSettings, elevation: Elevation, runner: R) -> Self {
        Self {
            node,
            settings,
            elevation,
            runner,
            connection: Mutex::new(None),
        }
    }

    /// Establish the connection now instead of on the first command.
    ///
    /// # Errors
    ///
    /// Returns the connection failure.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        self.connection().await.map(|_| ())
    }

    /// Forget the current connection; the next command dials again.
    pub async fn invalidate(&self) {
        if self.connection.lock().await.take().is_some() {
            tracing::debug!(node = %self.node, "connection invalidated");
        }
    }

    /// Close the connection gracefully if one is open.
    pub async fn disconnect(&self) {
        let conn = self.connection.lock().await.take();
        if let Some(conn) = conn {
            conn.close(&self.runner, &self.node).await;
        }
    }

    async fn connection(&self) -> Result<Arc<SshConnection>, ConnectionError> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(Arc::clone(conn));
        }
        tracing::debug!(node = %self.node, user = %self.settings.user, "connecting");
        let conn = Arc::new(SshConnection::establish(&self.runner, &self.node, &self.settings).await?);
        *guard = Some(Arc::clone(&conn));
        Ok(conn)
    }

    fn transport_error(&self, reason: impl Into<String>) -> RemoteError {
        TransportError {
            node: self.node.to_string(),
            reason: reason.into(),
        }
        .into()
    }
}

#[async_trait]
impl<R: CommandRunner> RemoteTarget for SshTarget<R> {
    fn node(&self) -> &NodeAddress {
        &self.node
    }

    async fn run(
        &self,
        command: &RemoteCommand,
        input: Option<&[u8]>,
    ) -> Result<CommandResult, RemoteError> {
        let conn = self.connection().await?;
        let rendered = command.render(self.elevation);
        tracing::debug!(node = %self.node, command = %rendered, "executing");

        let args = conn.session_args(&self.node, &rendered);
        let result = self
            .runner
            .run(conn.program(), &args, input, self.settings.command_timeout)
            .await
            .map_err(|e| match e {
                ProcessError::TimedOut { secs, .. } => RemoteError::TimedOut {
                    command: command.to_shell(),
                    secs,
                },
                ProcessError::Cancelled { .. } => RemoteError::Cancelled {
                    command: command.to_shell(),
                },
                other => self.transport_error(other.to_string()),
            })?;

        if result.exit_code == Some(SSH_FAILURE_EXIT) {
            let reason = result
                .stderr
                .lines()
                .map(str::trim)
                .rfind(|l| !l.is_empty())
                .unwrap_or("ssh exited with status 255");
            return Err(self.transport_error(reason));
        }
        tracing::debug!(node = %self.node, exit_code = ?result.exit_code, "command finished");
        Ok(result)
    }
}
