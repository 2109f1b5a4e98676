//! Tests for `TokioCommandRunner` with large and interleaved output.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use kubeboot_cli::application::ports::CommandRunner;
use kubeboot_cli::infra::command_runner::TokioCommandRunner;

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

#[tokio::test]
async fn test_large_output_on_both_streams_does_not_deadlock() {
    // Well past the 64 KiB pipe buffer on each stream.
    let script = "i=0; while [ $i -lt 4000 ]; do \
                  echo 'out-line-with-some-padding-to-fill-the-pipe-quickly'; \
                  echo 'err-line-with-some-padding-to-fill-the-pipe-quickly' >&2; \
                  i=$((i+1)); done";
    let result = TokioCommandRunner::default()
        .run("sh", &sh(script), None, Duration::from_secs(60))
        .await
        .unwrap();

    assert!(result.success());
    assert_eq!(result.stdout.lines().count(), 4000);
    assert_eq!(result.stderr.lines().count(), 4000);
    assert!(result.stdout.len() > 64 * 1024);
    assert!(result.stderr.len() > 64 * 1024);
}

#[tokio::test]
async fn test_large_stdin_is_fully_delivered() {
    let input = vec![b'x'; 1024 * 1024];
    let result = TokioCommandRunner::default()
        .run("wc", &["-c".to_string()], Some(&input), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(result.stdout.trim(), "1048576");
}

#[tokio::test]
async fn test_child_ignoring_stdin_still_completes() {
    let input = vec![b'x'; 1024 * 1024];
    let result = TokioCommandRunner::default()
        .run("sh", &sh("exit 4"), Some(&input), Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(result.exit_code, Some(4));
}

#[tokio::test]
async fn test_invalid_utf8_output_is_replaced_not_fatal() {
    let result = TokioCommandRunner::default()
        .run("printf", &["\\377ok\\n".to_string()], None, Duration::from_secs(10))
        .await
        .unwrap();
    assert!(result.stdout.ends_with("ok\n"));
    assert!(result.stdout.contains('\u{FFFD}'));
}

#[tokio::test]
async fn test_output_without_trailing_newline_is_kept() {
    let result = TokioCommandRunner::default()
        .run("printf", &["no-newline".to_string()], None, Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(result.stdout, "no-newline");
}
