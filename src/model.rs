use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default SSH port used when a host is given without an explicit port.
pub const DEFAULT_PORT: u16 = 22;

/// One IP/MAC pair captured from a device's ARP table.
///
/// Entries keep the order in which they appeared in the raw output and are
/// not deduplicated. The `mac` field stays in whatever delimiter convention
/// the vendor's output used; normalization happens at report time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArpEntry {
    pub ip: String,  // dotted-quad textual form
    pub mac: String, // native vendor delimiter form
}

/// A harvest target parsed from a `hostname` or `hostname:port` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub hostname: String,
    pub port: u16,
}

#[derive(Error, Debug)]
pub enum HostTargetError {
    #[error("empty host name in '{0}'")]
    EmptyHostname(String),
    #[error("invalid port in '{0}'")]
    InvalidPort(String),
}

impl FromStr for HostTarget {
    type Err = HostTargetError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (hostname, port) = match raw.split_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| HostTargetError::InvalidPort(raw.to_string()))?;
                (host, port)
            }
            None => (raw, DEFAULT_PORT),
        };

        if hostname.is_empty() {
            return Err(HostTargetError::EmptyHostname(raw.to_string()));
        }

        Ok(Self {
            hostname: hostname.to_string(),
            port,
        })
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == DEFAULT_PORT {
            write!(f, "{}", self.hostname)
        } else {
            write!(f, "{}:{}", self.hostname, self.port)
        }
    }
}
