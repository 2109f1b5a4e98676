//! `SshTarget` end to end against a scripted `ssh` stand-in.
//!
//! The fake client creates the control socket path when started as a master,
//! answers `-O` requests and otherwise runs the remote command with the local
//! shell, so sessions, stdin and exit codes go through the real runner.

#![cfg(unix)]
#![allow(clippy::unwrap_used)]

use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kubeboot_cli::application::ports::RemoteTarget;
use kubeboot_cli::domain::config::SshConfig;
use kubeboot_cli::domain::{
    ConnectionError, Elevation, HostKeyPolicy, NodeAddress, RemoteCommand, RemoteError,
};
use kubeboot_cli::infra::command_runner::TokioCommandRunner;
use kubeboot_cli::infra::ssh::{SshSettings, SshTarget};
use tempfile::TempDir;

use crate::helpers::{FAKE_SSH, UNREACHABLE_SSH, install_script, ssh_calls};

struct Fixture {
    dir: TempDir,
    _agent: UnixListener,
    agent_path: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let agent_path = dir.path().join("agent.sock");
        let agent = UnixListener::bind(&agent_path).unwrap();
        Self {
            dir,
            _agent: agent,
            agent_path,
        }
    }

    fn settings(&self, script: &str) -> SshSettings {
        let program = install_script(self.dir.path(), "ssh", script);
        let config = SshConfig {
            host_key_checking: HostKeyPolicy::Insecure,
            connect_timeout_secs: 2,
            command_timeout_secs: 10,
            ..SshConfig::default()
        };
        let mut settings = SshSettings::new(
            "root",
            Some(self.agent_path.clone()),
            self.dir.path().join("known_hosts"),
            &config,
        );
        settings.program = program.display().to_string();
        settings
    }

    fn target(&self, script: &str, elevation: Elevation) -> SshTarget<TokioCommandRunner> {
        SshTarget::new(
            NodeAddress::new("node-1", 22),
            self.settings(script),
            elevation,
            TokioCommandRunner::default(),
        )
    }

    fn calls(&self) -> Vec<String> {
        ssh_calls(self.dir.path())
    }

    fn count(&self, kind: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == kind).count()
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[tokio::test]
async fn test_commands_share_one_master() {
    let fx = Fixture::new();
    let target = fx.target(FAKE_SSH, Elevation::None);

    let first = target
        .execute(&RemoteCommand::new("echo").arg("one"))
        .await
        .unwrap();
    let second = target
        .execute(&RemoteCommand::new("echo").arg("two"))
        .await
        .unwrap();

    assert_eq!(first.stdout, "one\n");
    assert_eq!(second.stdout, "two\n");
    assert_eq!(fx.count("master"), 1);
    assert_eq!(fx.count("session"), 2);
    target.disconnect().await;
    assert_eq!(fx.count("control exit"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_dials_once() {
    let fx = Fixture::new();
    let target = fx.target(FAKE_SSH, Elevation::None);
    let one = RemoteCommand::new("echo").arg("one");
    let two = RemoteCommand::new("echo").arg("two");
    let three = RemoteCommand::new("echo").arg("three");

    let (a, b, c) = tokio::join!(
        target.execute(&one),
        target.execute(&two),
        target.execute(&three)
    );

    assert_eq!(a.unwrap().stdout, "one\n");
    assert_eq!(b.unwrap().stdout, "two\n");
    assert_eq!(c.unwrap().stdout, "three\n");
    assert_eq!(fx.count("master"), 1);
    assert_eq!(fx.count("session"), 3);
    target.disconnect().await;
}

#[tokio::test]
async fn test_stdin_and_redirect_reach_the_remote_shell() {
    let fx = Fixture::new();
    let target = fx.target(FAKE_SSH, Elevation::None);
    let out = fx.path().join("written.txt").display().to_string();

    target
        .execute_with_stdin(&RemoteCommand::new("cat").stdout_to(out.clone()), b"piped bytes")
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "piped bytes");
    target.disconnect().await;
}

#[tokio::test]
async fn test_nonzero_exit_is_command_error_with_output() {
    let fx = Fixture::new();
    let target = fx.target(FAKE_SSH, Elevation::None);

    let err = target
        .execute(&RemoteCommand::new("sh").args(["-c", "echo boom >&2; exit 3"]))
        .await
        .unwrap_err();

    match err {
        RemoteError::Command(e) => {
            assert_eq!(e.exit_code, Some(3));
            assert_eq!(e.stderr.trim(), "boom");
        }
        other => panic!("expected Command, got {other:?}"),
    }
    target.disconnect().await;
}

#[tokio::test]
async fn test_run_returns_failure_without_raising() {
    let fx = Fixture::new();
    let target = fx.target(FAKE_SSH, Elevation::None);
    let result = target
        .run(&RemoteCommand::new("false"), None)
        .await
        .unwrap();
    assert_eq!(result.exit_code, Some(1));
    target.disconnect().await;
}

#[tokio::test]
async fn test_exit_255_is_transport_error() {
    let fx = Fixture::new();
    let target = fx.target(FAKE_SSH, Elevation::None);

    let err = target
        .execute(&RemoteCommand::new("sh").args(["-c", "echo 'mux_client: broken pipe' >&2; exit 255"]))
        .await
        .unwrap_err();

    match err {
        RemoteError::Transport(e) => {
            assert_eq!(e.node, "node-1:22");
            assert_eq!(e.reason, "mux_client: broken pipe");
        }
        other => panic!("expected Transport, got {other:?}"),
    }
    target.disconnect().await;
}

#[tokio::test]
async fn test_invalidate_dials_again() {
    let fx = Fixture::new();
    let target = fx.target(FAKE_SSH, Elevation::None);

    target.connect().await.unwrap();
    target.invalidate().await;
    target.execute(&RemoteCommand::new("true")).await.unwrap();

    assert_eq!(fx.count("master"), 2);
    target.disconnect().await;
}

#[tokio::test]
async fn test_session_timeout_is_reported() {
    let fx = Fixture::new();
    let mut settings = fx.settings(FAKE_SSH);
    settings.command_timeout = Duration::from_millis(300);
    let target = SshTarget::new(
        NodeAddress::new("node-1", 22),
        settings,
        Elevation::None,
        TokioCommandRunner::default(),
    );

    let err = target
        .execute(&RemoteCommand::new("sleep").arg("30"))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::TimedOut { ref command, .. } if command == "sleep 30"));
    target.disconnect().await;
}

#[tokio::test]
async fn test_failed_master_is_classified_from_its_log() {
    let fx = Fixture::new();
    let target = fx.target(UNREACHABLE_SSH, Elevation::None);

    let err = target.connect().await.unwrap_err();
    match err {
        ConnectionError::Dial { node, reason } => {
            assert_eq!(node, "node-1:22");
            assert!(reason.contains("Connection refused"), "{reason}");
        }
        other => panic!("expected Dial, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_agent_fails_before_starting_ssh() {
    let fx = Fixture::new();
    let mut settings = fx.settings(FAKE_SSH);
    settings.agent_socket = None;
    let target = SshTarget::new(
        NodeAddress::new("node-1", 22),
        settings,
        Elevation::None,
        TokioCommandRunner::default(),
    );

    let err = target
        .execute(&RemoteCommand::new("true"))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Connection(ConnectionError::NoAgent)));
    assert!(fx.calls().is_empty());
}

#[tokio::test]
async fn test_agent_path_that_is_not_a_socket_is_rejected() {
    let fx = Fixture::new();
    let mut settings = fx.settings(FAKE_SSH);
    let plain = fx.path().join("not-a-socket");
    std::fs::write(&plain, b"").unwrap();
    settings.agent_socket = Some(plain);
    let target = SshTarget::new(
        NodeAddress::new("node-1", 22),
        settings,
        Elevation::None,
        TokioCommandRunner::default(),
    );
    assert!(matches!(
        target.connect().await.unwrap_err(),
        ConnectionError::NoAgent
    ));
}

#[tokio::test]
async fn test_strict_policy_without_pinned_key_refuses_to_dial() {
    let fx = Fixture::new();
    let mut settings = fx.settings(FAKE_SSH);
    settings.host_key_policy = HostKeyPolicy::Strict;
    let target = SshTarget::new(
        NodeAddress::new("node-1", 22),
        settings,
        Elevation::None,
        TokioCommandRunner::default(),
    );

    let err = target.connect().await.unwrap_err();
    assert!(matches!(err, ConnectionError::HostKey { .. }));
    assert!(fx.calls().is_empty());
}

#[tokio::test]
async fn test_strict_policy_with_pinned_key_connects() {
    let fx = Fixture::new();
    let mut settings = fx.settings(FAKE_SSH);
    settings.host_key_policy = HostKeyPolicy::Strict;
    std::fs::write(
        &settings.known_hosts,
        "node-1 ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIHl0ZXN0a2V5\n",
    )
    .unwrap();
    let target = SshTarget::new(
        NodeAddress::new("node-1", 22),
        settings,
        Elevation::None,
        TokioCommandRunner::default(),
    );

    target.connect().await.unwrap();
    assert_eq!(fx.count("master"), 1);
    target.disconnect().await;
}
