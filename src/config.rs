//! Run configuration threaded explicitly from the CLI down to the pipeline.

use std::path::PathBuf;
use std::time::Duration;

use crate::model::HostTarget;
use crate::transport::{SessionConfig, CONNECT_TIMEOUT};
use crate::vendor::VendorKind;

/// Settings shared by every host in one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Device dialect all targets of this run speak.
    pub vendor: VendorKind,

    /// Login user on the devices.
    pub username: String,

    /// Private key for authentication; ssh-agent identities when absent.
    pub key_path: Option<PathBuf>,

    /// Bound on session establishment per attempt.
    pub connect_timeout: Duration,
}

impl HarvestConfig {
    pub fn new(vendor: VendorKind, username: String, key_path: Option<PathBuf>) -> Self {
        Self {
            vendor,
            username,
            key_path,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    /// Session parameters for one target host.
    pub fn session_config(&self, target: &HostTarget) -> SessionConfig {
        SessionConfig {
            host: target.hostname.clone(),
            port: target.port,
            username: self.username.clone(),
            key_path: self.key_path.clone(),
            connect_timeout: self.connect_timeout,
            disable_rsa_sha2: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_carries_target_port() {
        let config = HarvestConfig::new(VendorKind::Cisco, "admin".to_string(), None);
        let target: HostTarget = "sw1:2202".parse().unwrap();

        let session = config.session_config(&target);
        assert_eq!(session.host, "sw1");
        assert_eq!(session.port, 2202);
        assert_eq!(session.connect_timeout, Duration::from_secs(5));
        assert!(!session.disable_rsa_sha2);
    }
}
