//! JSON output helpers shared by every `--json` code path.

use anyhow::{Context, Result};
use serde::Serialize;

/// Pretty-print `value` to stdout.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}

/// Format a JSON error object:
///
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for the outermost known error in `err`.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    use crate::domain::{ApplyError, ConfigError, ConnectionError};

    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ApplyError>() {
            return match e {
                ApplyError::UnknownState(_) => "unknown_state",
                ApplyError::StepFailed { .. } => "step_failed",
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return "invalid_config";
        }
        if cause.downcast_ref::<ConnectionError>().is_some() {
            return "connection_failed";
        }
    }
    "error"
}
