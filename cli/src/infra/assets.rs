//! Embedded assets: unit files and kubeadm templates installed on nodes.
//!
//! At compile time, `include_dir!` embeds everything under `cli/assets/`:
//!   - `kubelet.service`       — systemd unit for the kubelet
//!   - `10-kubeadm.conf.j2`    — kubelet drop-in, rendered per node
//!   - `kubelet.sysconfig`     — `/etc/sysconfig/kubelet` on SUSE-like systems
//!   - `kubeadm-init.yaml.j2`  — `kubeadm init` configuration
//!   - `kubeadm-join.yaml.j2`  — `kubeadm join` configuration

use anyhow::{Context, Result};
use include_dir::{Dir, include_dir};

use crate::application::ports::AssetStore;

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Return the raw bytes of a single embedded asset.
///
/// # Errors
///
/// Returns an error if no asset with the given `name` exists.
pub fn get_asset(name: &str) -> Result<&'static [u8]> {
    EMBEDDED_ASSETS
        .get_file(name)
        .map(|f| f.contents())
        .ok_or_else(|| anyhow::anyhow!("embedded asset not found: {name}"))
}

/// `AssetStore` backed by the assets compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

impl AssetStore for EmbeddedAssets {
    fn asset(&self, name: &str) -> Result<String> {
        let bytes = get_asset(name)?;
        String::from_utf8(bytes.to_vec()).with_context(|| format!("asset {name} is not UTF-8"))
    }
}
