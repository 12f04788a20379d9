//! SSH transport backed by `russh`.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use russh::client::{self, Config, Handle};
use russh::keys::agent::client::AgentClient;
use russh::keys::ssh_key::{Algorithm, HashAlg, PublicKey};
use russh::keys::{load_secret_key, PrivateKeyWithHashAlg};
use russh::{ChannelMsg, Disconnect, Preferred};
use tracing::debug;

use super::{CommandError, ConnectError, DeviceSession, DeviceTransport, SessionConfig};

/// Accepts any host key. Targets are operator-supplied on the command line;
/// known-hosts pinning is left to the surrounding tooling.
struct AcceptAllHosts;

impl client::Handler for AcceptAllHosts {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// [`DeviceTransport`] implementation speaking SSH via `russh`.
pub struct SshTransport;

#[async_trait]
impl DeviceTransport for SshTransport {
    type Session = SshSession;

    async fn connect(&self, config: &SessionConfig) -> Result<Self::Session, ConnectError> {
        let ssh_config = Arc::new(Config {
            preferred: preferred_algorithms(config.disable_rsa_sha2),
            ..Config::default()
        });

        let mut handle = client::connect(
            ssh_config,
            (config.host.as_str(), config.port),
            AcceptAllHosts,
        )
        .await
        .map_err(classify_ssh_error)?;

        authenticate(&mut handle, config).await?;

        Ok(SshSession { handle })
    }
}

/// The negotiation offer, with `rsa-sha2-256`/`rsa-sha2-512` filtered out of
/// the key algorithms when the fallback is active.
fn preferred_algorithms(disable_rsa_sha2: bool) -> Preferred {
    if !disable_rsa_sha2 {
        return Preferred::DEFAULT;
    }

    let key: Vec<Algorithm> = Preferred::DEFAULT
        .key
        .iter()
        .filter(|alg| !matches!(alg, Algorithm::Rsa { hash: Some(_) }))
        .cloned()
        .collect();

    Preferred {
        key: Cow::Owned(key),
        ..Preferred::DEFAULT
    }
}

fn classify_ssh_error(err: russh::Error) -> ConnectError {
    use russh::Error as Ssh;

    match err {
        Ssh::NoCommonAlgo { .. } => ConnectError::AlgorithmNegotiation(err.to_string()),
        other => ConnectError::Other(other.to_string()),
    }
}

async fn authenticate(
    handle: &mut Handle<AcceptAllHosts>,
    config: &SessionConfig,
) -> Result<(), ConnectError> {
    if let Some(path) = &config.key_path {
        let key = load_secret_key(path, None).map_err(|err| {
            ConnectError::Other(format!("cannot load key '{}': {err}", path.display()))
        })?;

        let hash_alg = match key.algorithm() {
            Algorithm::Rsa { .. } => rsa_hash(handle, config.disable_rsa_sha2).await?,
            _ => None,
        };

        let auth = handle
            .authenticate_publickey(
                config.username.clone(),
                PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
            )
            .await
            .map_err(classify_ssh_error)?;

        if auth.success() {
            return Ok(());
        }
        return Err(ConnectError::Auth(format!(
            "key authentication rejected for user '{}'",
            config.username
        )));
    }

    // No key file given: offer every identity the local ssh-agent holds.
    let mut agent = AgentClient::connect_env()
        .await
        .map_err(|err| ConnectError::Auth(format!("ssh-agent unavailable: {err}")))?;
    let identities = agent
        .request_identities()
        .await
        .map_err(|err| ConnectError::Auth(format!("cannot list agent identities: {err}")))?;

    for key in identities {
        let hash_alg = match key.algorithm() {
            Algorithm::Rsa { .. } => rsa_hash(handle, config.disable_rsa_sha2).await?,
            _ => None,
        };

        let auth = handle
            .authenticate_publickey_with(config.username.clone(), key, hash_alg, &mut agent)
            .await
            .map_err(|err| ConnectError::Auth(err.to_string()))?;

        if auth.success() {
            return Ok(());
        }
    }

    Err(ConnectError::Auth(format!(
        "no agent identity accepted for user '{}'",
        config.username
    )))
}

/// RSA signature hash to use: the server's best advertised rsa-sha2 variant
/// normally, plain ssh-rsa when the fallback disabled those algorithms.
async fn rsa_hash(
    handle: &mut Handle<AcceptAllHosts>,
    disable_rsa_sha2: bool,
) -> Result<Option<HashAlg>, ConnectError> {
    if disable_rsa_sha2 {
        return Ok(None);
    }

    let best = handle
        .best_supported_rsa_hash()
        .await
        .map_err(classify_ssh_error)?;
    Ok(best.flatten())
}

/// One authenticated SSH session; each command runs on its own exec channel.
pub struct SshSession {
    handle: Handle<AcceptAllHosts>,
}

#[async_trait]
impl DeviceSession for SshSession {
    async fn run(&mut self, command: &str) -> Result<String, CommandError> {
        let fail = |reason: String| CommandError {
            command: command.to_string(),
            reason,
        };

        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|err| fail(err.to_string()))?;
        channel
            .exec(true, command)
            .await
            .map_err(|err| fail(err.to_string()))?;

        let mut output = String::new();
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => {
                    output.push_str(&String::from_utf8_lossy(data));
                }
                ChannelMsg::ExitStatus { exit_status } => {
                    debug!(command, exit_status, "command finished");
                }
                _ => {}
            }
        }

        Ok(output)
    }

    async fn close(&mut self) {
        let _ = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await;
    }
}
