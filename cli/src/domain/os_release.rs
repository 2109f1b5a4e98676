//! `/etc/os-release` parsing.

use std::collections::HashMap;

/// Path of the OS identification file on a node.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Key/value view of an os-release file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    fields: HashMap<String, String>,
}

impl OsRelease {
    /// Parse os-release content. Comments, blank lines and lines without `=`
    /// are skipped; surrounding single or double quotes are removed.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let fields = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), unquote(value.trim()).to_string()))
            .collect();
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// `true` when `ID_LIKE` mentions `suse` (SLES, openSUSE and derivatives).
    #[must_use]
    pub fn is_suse_like(&self) -> bool {
        self.get("ID_LIKE").is_some_and(|v| v.contains("suse"))
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
