//! Remote-session transport seam.
//!
//! The harvester only needs two capabilities from a device: open an
//! administrative session, and run a command string for its output. Both
//! sit behind traits so the pipeline is testable against scripted mock
//! transports; the real SSH implementation lives in [`ssh`].

pub mod ssh;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Bound on session establishment. Command execution itself carries no
/// independent timeout; the transport's read semantics govern it.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything needed to open one device session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Private key to authenticate with; the local ssh-agent is offered
    /// when absent.
    pub key_path: Option<PathBuf>,
    pub connect_timeout: Duration,
    /// When set, the `rsa-sha2-256` and `rsa-sha2-512` signature algorithms
    /// are left out of negotiation. Used for the one-shot fallback retry
    /// against devices that mishandle them.
    pub disable_rsa_sha2: bool,
}

impl SessionConfig {
    /// Copy of this config with the rsa-sha2 fallback enabled.
    pub fn with_rsa_sha2_disabled(&self) -> Self {
        Self {
            disable_rsa_sha2: true,
            ..self.clone()
        }
    }
}

/// Session-establishment failures.
///
/// Only [`ConnectError::AlgorithmNegotiation`] triggers the fallback retry;
/// every other kind is fatal for the host.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("algorithm negotiation failed: {0}")]
    AlgorithmNegotiation(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("connection timed out after {0}s")]
    Timeout(u64),
    #[error("connection failed: {0}")]
    Other(String),
}

impl ConnectError {
    pub fn is_algorithm_negotiation(&self) -> bool {
        matches!(self, ConnectError::AlgorithmNegotiation(_))
    }
}

/// A command that could not be run to completion.
#[derive(Error, Debug)]
#[error("command '{command}' failed: {reason}")]
pub struct CommandError {
    pub command: String,
    pub reason: String,
}

/// Opens administrative sessions to devices.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    type Session: DeviceSession;

    async fn connect(&self, config: &SessionConfig) -> Result<Self::Session, ConnectError>;
}

/// One open session on a device.
#[async_trait]
pub trait DeviceSession: Send {
    /// Runs a command and returns its complete output. The device's exit
    /// status is not interpreted; whatever text came back is the result.
    async fn run(&mut self, command: &str) -> Result<String, CommandError>;

    /// Best-effort session teardown.
    async fn close(&mut self);
}
