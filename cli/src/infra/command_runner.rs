//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout, cancellation and kill.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::application::ports::CommandRunner;
use crate::domain::{CommandResult, ProcessError};

/// Production `CommandRunner`.
///
/// Both output pipes are drained concurrently with the process wait, so a
/// child filling one pipe while the other is unread can never deadlock.
/// `tokio::time::timeout` around a wait would drop the future and leave the
/// OS process running; the `select!` below kills it explicitly instead.
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner {
    cancel: CancellationToken,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        input: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<CommandResult, ProcessError> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdin_task = match (child.stdin.take(), input) {
            (Some(mut stdin), Some(input)) => {
                let input = input.to_vec();
                Some(tokio::spawn(async move {
                    // A child that exits without reading its input closes the
                    // pipe; that surfaces through its exit status instead.
                    let _ = stdin.write_all(&input).await;
                    let _ = stdin.shutdown().await;
                }))
            }
            _ => None,
        };

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    drain(stdout_handle, "stdout"),
                    drain(stderr_handle, "stderr"),
                );
                if let Some(task) = stdin_task {
                    let _ = task.await;
                }
                let status = status.map_err(|source| ProcessError::Wait {
                    program: program.to_string(),
                    source,
                })?;
                Ok(CommandResult {
                    stdout,
                    stderr,
                    exit_code: status.code(),
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                Err(ProcessError::TimedOut {
                    program: program.to_string(),
                    secs: timeout.as_secs(),
                })
            }
            () = self.cancel.cancelled() => {
                let _ = child.kill().await;
                Err(ProcessError::Cancelled {
                    program: program.to_string(),
                })
            }
        }
    }
}

/// Read `stream` to the end line by line, logging each line.
async fn drain<R>(stream: Option<R>, label: &'static str) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return String::new();
    };
    let mut reader = BufReader::new(stream);
    let mut out = String::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                tracing::debug!(stream = label, "{}", text.trim_end_matches(['\r', '\n']));
                out.push_str(&text);
            }
            Err(e) => {
                tracing::debug!(stream = label, error = %e, "stream read failed");
                break;
            }
        }
    }
    out
}
