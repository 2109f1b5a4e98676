//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::KubebootConfig;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "KUBEBOOT_CONFIG";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
#[derive(Debug, Clone, Default)]
pub struct YamlConfigStore {
    path: Option<PathBuf>,
}

impl YamlConfigStore {
    /// Store at `~/.kubeboot/config.yaml`, or `$KUBEBOOT_CONFIG` when set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store at a fixed path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<KubebootConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(KubebootConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, config: &KubebootConfig) -> Result<()> {
        let path = self.path()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("cannot write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot set permissions on {}", path.display()))?;
        }
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if let Some(val) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".kubeboot").join("config.yaml"))
    }
}
