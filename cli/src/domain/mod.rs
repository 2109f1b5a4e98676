//! Domain layer — pure types, parsing and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application` or `tokio`. All functions are synchronous and take
//! data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod kubeadm;
pub mod node;
pub mod os_release;
pub mod result;
pub mod steps;

pub use command::{Elevation, RemoteCommand};
pub use config::{HostKeyPolicy, KubebootConfig};
pub use error::{
    ApplyError, ConfigError, ConnectionError, ProcessError, RegistryError, RemoteCommandError,
    RemoteError, TransferError, TransportError, UnknownStateError,
};
pub use node::NodeAddress;
pub use os_release::OsRelease;
pub use result::CommandResult;
