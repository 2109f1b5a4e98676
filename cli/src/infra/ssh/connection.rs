//! Agent-authenticated OpenSSH master connection.
//!
//! The master runs as an owned child process listening on a control socket in
//! a private temporary directory. Every remote command is a fresh session
//! multiplexed over that socket, so authentication happens once per node.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::Child;
use tokio::time::Instant;

use crate::application::ports::CommandRunner;
use crate::domain::config::SshConfig;
use crate::domain::{ConnectionError, HostKeyPolicy, NodeAddress, ProcessError};
use crate::infra::ssh::known_hosts::KnownHostsManager;

/// Extra time the master gets on top of ssh's own `ConnectTimeout`.
const MASTER_GRACE: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to reach nodes as one user.
#[derive(Debug, Clone)]
pub struct SshSettings {
    /// ssh client binary.
    pub program: String,
    pub user: String,
    /// Value of `SSH_AUTH_SOCK`.
    pub agent_socket: Option<PathBuf>,
    pub host_key_policy: HostKeyPolicy,
    pub known_hosts: PathBuf,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl SshSettings {
    #[must_use]
    pub fn new(
        user: impl Into<String>,
        agent_socket: Option<PathBuf>,
        known_hosts: PathBuf,
        config: &SshConfig,
    ) -> Self {
        Self {
            program: "ssh".to_string(),
            user: user.into(),
            agent_socket,
            host_key_policy: config.host_key_checking,
            known_hosts,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            command_timeout: Duration::from_secs(config.command_timeout_secs),
        }
    }
}

/// A live master connection. Dropping it kills the master and removes the
/// control directory.
#[derive(Debug)]
pub struct SshConnection {
    node: String,
    program: String,
    options: Vec<String>,
    control_path: PathBuf,
    master: Mutex<Child>,
    _control_dir: TempDir,
}

impl SshConnection {
    /// Start the master for `node` and wait until its control socket answers.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::NoAgent`] without a usable agent socket,
    /// [`ConnectionError::Timeout`] when the master does not come up in time,
    /// and the classified failure when ssh gives up.
    pub async fn establish(
        runner: &dyn CommandRunner,
        node: &NodeAddress,
        settings: &SshSettings,
    ) -> Result<Self, ConnectionError> {
        let agent = agent_socket(settings)?;
        prepare_known_hosts(node, settings)?;

        let dial = |reason: String| ConnectionError::Dial {
            node: node.to_string(),
            reason,
        };
        let control_dir = tempfile::Builder::new()
            .prefix("kubeboot-")
            .tempdir()
            .map_err(|e| dial(format!("cannot create control directory: {e}")))?;
        let control_path = control_dir.path().join("master.sock");
        let log_path = control_dir.path().join("master.log");

        let options = base_options(node, settings, agent);
        let args = master_args(&options, &control_path, &log_path, node);
        tracing::debug!(node = %node, args = ?args, "starting ssh master");

        let mut master = tokio::process::Command::new(&settings.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| dial(format!("cannot run {}: {e}", settings.program)))?;

        let deadline = Instant::now() + settings.connect_timeout + MASTER_GRACE;
        loop {
            if let Some(status) = master
                .try_wait()
                .map_err(|e| dial(format!("waiting for ssh master: {e}")))?
            {
                let log = std::fs::read_to_string(&log_path).unwrap_or_default();
                tracing::debug!(node = %node, code = ?status.code(), log = %log.trim(), "ssh master exited");
                return Err(classify_failure(node, settings, &log));
            }

            if control_path.exists() {
                let check = control_args(&options, &control_path, "check", node);
                match runner
                    .run(&settings.program, &check, None, CONTROL_TIMEOUT)
                    .await
                {
                    Ok(result) if result.success() => break,
                    Ok(_) | Err(ProcessError::TimedOut { .. }) => {}
                    Err(ProcessError::Cancelled { .. }) => {
                        return Err(dial("connection attempt cancelled".to_string()));
                    }
                    Err(e) => return Err(dial(e.to_string())),
                }
            }

            if Instant::now() >= deadline {
                let _ = master.start_kill();
                return Err(ConnectionError::Timeout {
                    node: node.to_string(),
                    secs: settings.connect_timeout.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        tracing::debug!(node = %node, "ssh master ready");
        Ok(Self {
            node: node.to_string(),
            program: settings.program.clone(),
            options,
            control_path,
            master: Mutex::new(master),
            _control_dir: control_dir,
        })
    }

    /// Arguments for one multiplexed session running `remote_command`.
    #[must_use]
    pub fn session_args(&self, node: &NodeAddress, remote_command: &str) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            self.control_path.display().to_string(),
            "-o".to_string(),
            "ControlMaster=no".to_string(),
        ];
        args.extend(self.options.iter().cloned());
        args.push("--".to_string());
        args.push(node.host().to_string());
        args.push(remote_command.to_string());
        args
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Ask the master to exit. Failures are logged, not returned: the master
    /// is killed on drop regardless.
    pub async fn close(&self, runner: &dyn CommandRunner, node: &NodeAddress) {
        let args = control_args(&self.options, &self.control_path, "exit", node);
        match runner.run(&self.program, &args, None, CONTROL_TIMEOUT).await {
            Ok(result) if result.success() => {
                tracing::debug!(node = %self.node, "ssh master closed");
            }
            Ok(result) => {
                tracing::debug!(node = %self.node, stderr = %result.stderr.trim(), "ssh -O exit failed");
            }
            Err(e) => tracing::debug!(node = %self.node, error = %e, "ssh -O exit failed"),
        }
    }
}

impl Drop for SshConnection {
    fn drop(&mut self) {
        if let Ok(master) = self.master.get_mut() {
            let _ = master.start_kill();
        }
    }
}

fn agent_socket(settings: &SshSettings) -> Result<&Path, ConnectionError> {
    let path = settings
        .agent_socket
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ConnectionError::NoAgent)?;
    if is_socket(path) {
        Ok(path)
    } else {
        Err(ConnectionError::NoAgent)
    }
}

#[cfg(unix)]
fn is_socket(path: &Path) -> bool {
    use std::os::unix::fs::FileTypeExt;
    std::fs::metadata(path).is_ok_and(|m| m.file_type().is_socket())
}

#[cfg(not(unix))]
fn is_socket(path: &Path) -> bool {
    path.exists()
}

fn prepare_known_hosts(node: &NodeAddress, settings: &SshSettings) -> Result<(), ConnectionError> {
    if settings.host_key_policy == HostKeyPolicy::Insecure {
        return Ok(());
    }
    let manager = KnownHostsManager::with_path(settings.known_hosts.clone());
    manager.ensure().map_err(|e| ConnectionError::Dial {
        node: node.to_string(),
        reason: format!("{e:#}"),
    })?;
    if settings.host_key_policy == HostKeyPolicy::Strict {
        let pattern = known_hosts_pattern(node);
        if !manager.contains(&pattern).unwrap_or(false) {
            return Err(ConnectionError::HostKey {
                node: node.to_string(),
                reason: format!(
                    "no pinned key for {pattern} in {} (connect once with ssh.host_key_checking=accept-new)",
                    manager.path().display()
                ),
            });
        }
    }
    Ok(())
}

/// How ssh names `node` in `known_hosts`.
#[must_use]
pub fn known_hosts_pattern(node: &NodeAddress) -> String {
    if node.port() == crate::domain::node::DEFAULT_SSH_PORT {
        node.host().to_string()
    } else {
        format!("[{}]:{}", node.host(), node.port())
    }
}

/// Options shared by the master and every session.
#[must_use]
pub fn base_options(node: &NodeAddress, settings: &SshSettings, agent: &Path) -> Vec<String> {
    let mut opts = vec![
        "-p".to_string(),
        node.port().to_string(),
        "-l".to_string(),
        settings.user.clone(),
    ];
    let mut option = |value: String| {
        opts.push("-o".to_string());
        opts.push(value);
    };
    option("BatchMode=yes".to_string());
    option(format!("IdentityAgent={}", option_value(agent)));
    option("PasswordAuthentication=no".to_string());
    option("KbdInteractiveAuthentication=no".to_string());
    option(format!(
        "ConnectTimeout={}",
        settings.connect_timeout.as_secs().max(1)
    ));
    option("ServerAliveInterval=15".to_string());
    match settings.host_key_policy {
        HostKeyPolicy::Insecure => {
            option("StrictHostKeyChecking=no".to_string());
            option("UserKnownHostsFile=/dev/null".to_string());
        }
        HostKeyPolicy::AcceptNew | HostKeyPolicy::Strict => {
            let mode = if settings.host_key_policy == HostKeyPolicy::Strict {
                "yes"
            } else {
                "accept-new"
            };
            option(format!("StrictHostKeyChecking={mode}"));
            option(format!(
                "UserKnownHostsFile={}",
                option_value(&settings.known_hosts)
            ));
            option("HashKnownHosts=no".to_string());
        }
    }
    opts
}

fn master_args(options: &[String], control: &Path, log: &Path, node: &NodeAddress) -> Vec<String> {
    let mut args = vec![
        "-M".to_string(),
        "-N".to_string(),
        "-o".to_string(),
        format!("ControlPath={}", option_value(control)),
        "-E".to_string(),
        log.display().to_string(),
    ];
    args.extend(options.iter().cloned());
    args.push("--".to_string());
    args.push(node.host().to_string());
    args
}

fn control_args(options: &[String], control: &Path, op: &str, node: &NodeAddress) -> Vec<String> {
    let mut args = vec![
        "-S".to_string(),
        control.display().to_string(),
        "-O".to_string(),
        op.to_string(),
    ];
    args.extend(options.iter().cloned());
    args.push("--".to_string());
    args.push(node.host().to_string());
    args
}

/// ssh splits option values on whitespace unless they are double-quoted.
fn option_value(path: &Path) -> String {
    let text = path.display().to_string();
    if text.contains(char::is_whitespace) {
        format!("\"{text}\"")
    } else {
        text
    }
}

/// Map ssh's diagnostic output to a connection error.
#[must_use]
pub fn classify_failure(node: &NodeAddress, settings: &SshSettings, stderr: &str) -> ConnectionError {
    let node_name = node.to_string();
    let reason = stderr
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty() && !l.starts_with("Warning: Permanently added"))
        .unwrap_or("ssh exited without a diagnostic")
        .to_string();

    if stderr.contains("Host key verification failed")
        || stderr.contains("REMOTE HOST IDENTIFICATION HAS CHANGED")
    {
        ConnectionError::HostKey {
            node: node_name,
            reason,
        }
    } else if stderr.contains("Permission denied") || stderr.contains("Too many authentication failures") {
        ConnectionError::Auth {
            node: node_name,
            user: settings.user.clone(),
            reason,
        }
    } else if stderr.contains("Connection timed out") || stderr.contains("Operation timed out") {
        ConnectionError::Timeout {
            node: node_name,
            secs: settings.connect_timeout.as_secs(),
        }
    } else {
        ConnectionError::Dial {
            node: node_name,
            reason,
        }
    }
}
