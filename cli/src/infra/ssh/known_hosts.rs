//! Host key pinning file (`~/.kubeboot/known_hosts`).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Manages the private `known_hosts` file ssh records trusted node keys in.
#[derive(Debug, Clone)]
pub struct KnownHostsManager {
    path: PathBuf,
}

impl KnownHostsManager {
    /// Default location of the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".kubeboot").join("known_hosts"))
    }

    /// Creates a manager pointing at an arbitrary path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file (600) and its parent directory (700) if missing.
    /// Existing entries are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or permissions cannot be set.
    pub fn ensure(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create dir {}", parent.display()))?;
                set_permissions(parent, 0o700)?;
            }
        }
        if !self.path.exists() {
            std::fs::write(&self.path, "")
                .with_context(|| format!("write {}", self.path.display()))?;
        }
        set_permissions(&self.path, 0o600)
    }

    /// Whether an unhashed entry exists for `pattern` (`host` or `[host]:port`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn contains(&self, pattern: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        Ok(content
            .lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .filter_map(|l| l.split_whitespace().next())
            .any(|hosts| hosts.split(',').any(|h| h == pattern)))
    }
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
