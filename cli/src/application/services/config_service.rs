//! Application service — configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{KubebootConfig, set_config_value};

/// Load configuration.
pub fn load_config(store: &impl ConfigStore) -> Result<KubebootConfig> {
    store.load()
}

/// Set one dotted key and persist the result. Returns the updated config.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<KubebootConfig> {
    let mut config = store.load()?;
    set_config_value(&mut config, key, value)?;
    store.save(&config)?;
    Ok(config)
}
