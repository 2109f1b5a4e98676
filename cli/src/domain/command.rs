//! Structured remote commands and the privilege-elevation strategy.
//!
//! A [`RemoteCommand`] is an argument list, not a string. It is turned into
//! shell text only at the edge, by [`RemoteCommand::render`], which quotes
//! every word for a POSIX shell and applies [`Elevation`] exactly once.

use std::borrow::Cow;
use std::fmt;

/// How a command is run on the node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Elevation {
    /// Run as the login user.
    #[default]
    None,
    /// Run through `sudo sh -c '<command>'`.
    Sudo,
}

impl Elevation {
    #[must_use]
    pub fn from_sudo_flag(sudo: bool) -> Self {
        if sudo { Self::Sudo } else { Self::None }
    }

    /// Wrap already-rendered shell text according to this policy.
    #[must_use]
    pub fn wrap(self, script: &str) -> String {
        match self {
            Self::None => script.to_string(),
            Self::Sudo => format!("sudo sh -c '{}'", escape_single_quoted(script)),
        }
    }
}

/// A command to run on a node: program, arguments and an optional file the
/// command's standard output is redirected into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    program: String,
    args: Vec<String>,
    stdout_to: Option<String>,
}

impl RemoteCommand {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout_to: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Redirect standard output into `path` on the node (`> path`).
    ///
    /// The redirection is part of the rendered script, so under
    /// [`Elevation::Sudo`] the file is written by the elevated shell.
    #[must_use]
    pub fn stdout_to(mut self, path: impl Into<String>) -> Self {
        self.stdout_to = Some(path.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// File standard output is redirected into, if any.
    #[must_use]
    pub fn stdout_path(&self) -> Option<&str> {
        self.stdout_to.as_deref()
    }

    /// Render as POSIX shell text without elevation.
    #[must_use]
    pub fn to_shell(&self) -> String {
        let mut words: Vec<Cow<'_, str>> = Vec::with_capacity(self.args.len() + 3);
        words.push(quote(&self.program));
        words.extend(self.args.iter().map(|a| quote(a)));
        if let Some(path) = &self.stdout_to {
            words.push(Cow::Borrowed(">"));
            words.push(quote(path));
        }
        words.join(" ")
    }

    /// Render the exact text sent to the node.
    #[must_use]
    pub fn render(&self, elevation: Elevation) -> String {
        elevation.wrap(&self.to_shell())
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell())
    }
}

/// Quote one word for a POSIX shell.
///
/// Words made only of characters with no special meaning are returned as-is
/// so ordinary commands stay readable in logs.
#[must_use]
pub fn quote(word: &str) -> Cow<'_, str> {
    if !word.is_empty() && word.bytes().all(is_plain_byte) {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", escape_single_quoted(word)))
    }
}

fn is_plain_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"_@%+=:,./-".contains(&b)
}

fn escape_single_quoted(text: &str) -> String {
    text.replace('\'', r"'\''")
}
