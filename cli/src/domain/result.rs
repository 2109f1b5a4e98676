//! Captured outcome of one command execution.

use crate::domain::error::RemoteCommandError;

/// Standard output, standard error and exit code of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn a non-zero exit into a [`RemoteCommandError`] for `command`.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the captured output when the exit code is not 0.
    pub fn check(self, command: &str) -> Result<Self, RemoteCommandError> {
        if self.success() {
            return Ok(self);
        }
        Err(RemoteCommandError {
            command: command.to_string(),
            exit_code: self.exit_code,
            stdout: self.stdout,
            stderr: self.stderr,
        })
    }
}
