//! OpenSSH transport: master connection, per-command sessions and host key
//! pinning.

pub mod connection;
pub mod known_hosts;
pub mod target;

pub use connection::{SshConnection, SshSettings};
pub use known_hosts::KnownHostsManager;
pub use target::SshTarget;
