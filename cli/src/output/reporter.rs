//! `TerminalReporter`: the terminal side of `ProgressReporter`.

use std::sync::Mutex;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Reports step progress for one `apply` run.
///
/// On a TTY each step is a spinner that `success()` or `failure()` finishes.
/// Elsewhere lines are printed as `"  → {message}"` and `"  ✓ {message}"` on
/// stdout and `"  ✗ {message}"` on stderr. `quiet` silences everything but
/// failures.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    active: Mutex<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            active: Mutex::new(None),
        }
    }

    fn take_active(&self) -> Option<ProgressBar> {
        self.active.lock().ok().and_then(|mut a| a.take())
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if self.ctx.show_progress() {
            if let Ok(mut active) = self.active.lock() {
                *active = Some(progress::spinner(message));
            }
        } else {
            println!("  {} {message}", "→".style(self.ctx.styles.step));
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.take_active() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => println!("  {} {message}", "✓".style(self.ctx.styles.success)),
        }
    }

    fn failure(&self, message: &str) {
        match self.take_active() {
            Some(pb) => progress::finish_error(&pb, message),
            None => eprintln!("  {} {message}", "✗".style(self.ctx.styles.error)),
        }
    }
}
