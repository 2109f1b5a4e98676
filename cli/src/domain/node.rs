//! Node addresses as given on the command line.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::NodeAddressError;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Host and port of a node.
///
/// Accepted forms: `host`, `host:port`, `[v6addr]`, `[v6addr]:port` and a bare
/// IPv6 address without a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    host: String,
    port: u16,
}

impl NodeAddress {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `input`, using `default_port` when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input, an unparsable port or an unbalanced
    /// IPv6 bracket.
    pub fn parse_with_default(input: &str, default_port: u16) -> Result<Self, NodeAddressError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(NodeAddressError::Empty);
        }

        if let Some(rest) = input.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| NodeAddressError::Malformed(input.to_string()))?;
            if host.is_empty() {
                return Err(NodeAddressError::Empty);
            }
            let port = match tail {
                "" => default_port,
                _ => {
                    let port = tail
                        .strip_prefix(':')
                        .ok_or_else(|| NodeAddressError::Malformed(input.to_string()))?;
                    parse_port(port, input)?
                }
            };
            return Ok(Self::new(host, port));
        }

        match input.matches(':').count() {
            0 => Ok(Self::new(input, default_port)),
            1 => {
                let (host, port) = input
                    .split_once(':')
                    .ok_or_else(|| NodeAddressError::Malformed(input.to_string()))?;
                if host.is_empty() {
                    return Err(NodeAddressError::Empty);
                }
                Ok(Self::new(host, parse_port(port, input)?))
            }
            // Bare IPv6 literal; a port requires the bracketed form.
            _ => Ok(Self::new(input, default_port)),
        }
    }

    /// Host name or address, without brackets.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

fn parse_port(port: &str, input: &str) -> Result<u16, NodeAddressError> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(NodeAddressError::InvalidPort(input.to_string())),
        Ok(p) => Ok(p),
    }
}

impl FromStr for NodeAddress {
    type Err = NodeAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default(s, DEFAULT_SSH_PORT)
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
