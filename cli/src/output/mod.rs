//! Terminal output for kubeboot commands.

pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Styling and terminal state shared by every command.
pub struct OutputContext {
    pub styles: Styles,
    /// Stdout is a terminal.
    pub is_tty: bool,
    /// `--quiet`: only errors reach the terminal.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are enabled only on a terminal, without `--no-color` and
    /// without `NO_COLOR` in the environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let mut styles = Styles::default();
        if is_tty && !no_color && std::env::var_os("NO_COLOR").is_none() {
            styles.colorize();
        }
        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Spinners are drawn only on an interactive, non-quiet terminal.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// `key` dimmed, then `value`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }

    /// Closing line of a successful run: the node and how many steps it took.
    pub fn provisioned(&self, node: &str, steps: &[&str]) {
        if self.quiet {
            return;
        }
        let count = match steps.len() {
            1 => "1 step".to_string(),
            n => format!("{n} steps"),
        };
        println!(
            "  {} {node} provisioned {}",
            "✓".style(self.styles.success),
            format!("({count})").style(self.styles.dim)
        );
    }
}
