//! Domain types and validators for kubeboot configuration.
//!
//! Pure functions only: no I/O and no async.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::node::DEFAULT_SSH_PORT;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "ssh.port",
    "ssh.host_key_checking",
    "ssh.connect_timeout_secs",
    "ssh.command_timeout_secs",
    "transfer.verify_checksum",
    "kubeadm.image_repository",
    "kubeadm.kubernetes_version",
    "kubeadm.container_runtime",
    "kubeadm.control_plane_endpoint",
    "kubeadm.bootstrap_token",
    "kubeadm.ca_cert_hash",
    "cluster.dir",
];

pub const VALID_HOST_KEY_POLICIES: &[&str] = &["insecure", "accept-new", "strict"];

/// kubeadm bootstrap token: `[a-z0-9]{6}.[a-z0-9]{16}`.
pub static BOOTSTRAP_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9]{6}\.[a-z0-9]{16}$").expect("valid regex")
});

/// Discovery CA public key pin: `sha256:<64 hex digits>`.
pub static CA_CERT_HASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^sha256:[0-9a-f]{64}$").expect("valid regex")
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.kubeboot/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KubebootConfig {
    pub ssh: SshConfig,
    pub transfer: TransferConfig,
    pub kubeadm: KubeadmConfig,
    pub cluster: ClusterConfig,
}

/// Transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshConfig {
    /// Port used when a node argument carries none.
    pub port: u16,
    pub host_key_checking: HostKeyPolicy,
    pub connect_timeout_secs: u64,
    /// Upper bound for any single remote command.
    pub command_timeout_secs: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SSH_PORT,
            host_key_checking: HostKeyPolicy::default(),
            connect_timeout_secs: 15,
            command_timeout_secs: 900,
        }
    }
}

/// How the identity of a node is verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Accept any host key and never record it.
    Insecure,
    /// Trust on first use; later connections must present the pinned key.
    #[default]
    AcceptNew,
    /// Only connect to nodes whose key is already pinned.
    Strict,
}

impl HostKeyPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insecure => "insecure",
            Self::AcceptNew => "accept-new",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for HostKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostKeyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insecure" => Ok(Self::Insecure),
            "accept-new" => Ok(Self::AcceptNew),
            "strict" => Ok(Self::Strict),
            other => Err(invalid("ssh.host_key_checking", other, &VALID_HOST_KEY_POLICIES.join(", "))),
        }
    }
}

/// File transfer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransferConfig {
    /// Compare a remote `sha256sum` with the local digest after each upload.
    pub verify_checksum: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            verify_checksum: true,
        }
    }
}

/// Values rendered into the kubeadm and kubelet templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KubeadmConfig {
    pub image_repository: String,
    pub kubernetes_version: String,
    /// systemd unit of the container runtime enabled before `kubeadm init|join`.
    pub container_runtime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert_hash: Option<String>,
}

impl Default for KubeadmConfig {
    fn default() -> Self {
        Self {
            image_repository: "registry.k8s.io".to_string(),
            kubernetes_version: "stable-1".to_string(),
            container_runtime: "docker".to_string(),
            control_plane_endpoint: None,
            bootstrap_token: None,
            ca_cert_hash: None,
        }
    }
}

/// Local cluster definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Directory holding `pki/` and `admin.conf` for `kubernetes.upload-secrets`.
    pub dir: PathBuf,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<(), ConfigError> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        });
    }
    Ok(())
}

/// Parses `value` for `key` and stores it in `config`.
///
/// An empty value clears optional kubeadm settings.
///
/// # Errors
///
/// Returns an error if the key is unknown or the value does not parse.
pub fn set_config_value(
    config: &mut KubebootConfig,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    validate_config_key(key)?;
    match key {
        "ssh.port" => {
            config.ssh.port = match value.parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => return Err(invalid(key, value, "1-65535")),
            };
        }
        "ssh.host_key_checking" => config.ssh.host_key_checking = value.parse()?,
        "ssh.connect_timeout_secs" => config.ssh.connect_timeout_secs = parse_secs(key, value)?,
        "ssh.command_timeout_secs" => config.ssh.command_timeout_secs = parse_secs(key, value)?,
        "transfer.verify_checksum" => {
            config.transfer.verify_checksum = value
                .parse()
                .map_err(|_| invalid(key, value, "true, false"))?;
        }
        "kubeadm.image_repository" => {
            config.kubeadm.image_repository = non_empty(key, value)?;
        }
        "kubeadm.kubernetes_version" => {
            config.kubeadm.kubernetes_version = non_empty(key, value)?;
        }
        "kubeadm.container_runtime" => {
            config.kubeadm.container_runtime = non_empty(key, value)?;
        }
        "kubeadm.control_plane_endpoint" => {
            config.kubeadm.control_plane_endpoint = optional(value);
        }
        "kubeadm.bootstrap_token" => {
            config.kubeadm.bootstrap_token =
                optional_matching(key, value, &BOOTSTRAP_TOKEN_RE, "abcdef.0123456789abcdef")?;
        }
        "kubeadm.ca_cert_hash" => {
            config.kubeadm.ca_cert_hash =
                optional_matching(key, value, &CA_CERT_HASH_RE, "sha256:<64 hex digits>")?;
        }
        "cluster.dir" => config.cluster.dir = PathBuf::from(non_empty(key, value)?),
        _ => {
            return Err(ConfigError::UnknownKey {
                key: key.to_string(),
                valid: VALID_CONFIG_KEYS.join(", "),
            });
        }
    }
    Ok(())
}

fn invalid(key: &str, value: &str, valid: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        valid: valid.to_string(),
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(invalid(key, value, "a positive number of seconds")),
    }
}

fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(key, value, "a non-empty string"));
    }
    Ok(value.to_string())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn optional_matching(
    key: &str,
    value: &str,
    pattern: &Regex,
    example: &str,
) -> Result<Option<String>, ConfigError> {
    match optional(value) {
        Some(v) if !pattern.is_match(&v) => Err(invalid(key, &v, &format!("e.g. {example}"))),
        other => Ok(other),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
