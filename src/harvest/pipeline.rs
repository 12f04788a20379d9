//! Per-host harvest pipeline.
//!
//! Executes one host's full collection sequence: connect (with the one-shot
//! algorithm fallback retry) → run the vendor's commands on the open session
//! → extract IP/MAC pairs → persist the report. Every stage failure carries
//! the hostname so the operator can tell which device and which stage broke.

use std::time::Instant;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::extract::extract_entries;
use crate::model::ArpEntry;
use crate::report::{ReportError, ReportWriter, WrittenPaths};
use crate::transport::{
    CommandError, ConnectError, DeviceSession, DeviceTransport, SessionConfig,
};
use crate::vendor::VendorKind;

/// Errors that end one host's harvest. Other hosts are unaffected.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("connecting to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: ConnectError,
    },

    #[error("running commands on {host} failed: {source}")]
    Command {
        host: String,
        #[source]
        source: CommandError,
    },

    #[error("persisting results for {host} failed: {source}")]
    Persist {
        host: String,
        #[source]
        source: ReportError,
    },
}

/// Timing collected while harvesting one host.
#[derive(Debug, Default, Clone)]
pub struct HarvestStats {
    pub connect_duration_ms: u64,
    pub command_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Outcome of one successfully harvested host.
#[derive(Debug)]
pub struct HarvestReport {
    pub hostname: String,
    pub entries: Vec<ArpEntry>,
    pub paths: WrittenPaths,
    pub stats: HarvestStats,
}

/// Per-host collection pipeline over an abstract device transport.
///
/// The transport and the writer are injected so tests run the full pipeline
/// against scripted sessions and a throwaway results directory.
pub struct HarvestPipeline<T: DeviceTransport> {
    transport: T,
    writer: ReportWriter,
}

impl<T: DeviceTransport> HarvestPipeline<T> {
    pub fn new(transport: T, writer: ReportWriter) -> Self {
        Self { transport, writer }
    }

    /// Harvests one host: connect, run the vendor's commands, extract, write.
    pub async fn harvest(
        &self,
        config: &SessionConfig,
        vendor: VendorKind,
    ) -> Result<HarvestReport, HarvestError> {
        let host = config.host.clone();
        let started = Instant::now();
        let mut stats = HarvestStats::default();

        info!(host = %host, vendor = %vendor, "connecting");
        let connect_started = Instant::now();
        let mut session =
            self.connect_with_fallback(config)
                .await
                .map_err(|source| HarvestError::Connect {
                    host: host.clone(),
                    source,
                })?;
        stats.connect_duration_ms = connect_started.elapsed().as_millis() as u64;

        let profile = vendor.profile();
        let command_started = Instant::now();
        let mut raw = String::new();
        for command in profile.commands {
            info!(host = %host, command, "sending command");
            let output = session
                .run(command)
                .await
                .map_err(|source| HarvestError::Command {
                    host: host.clone(),
                    source,
                })?;
            raw.push_str(&output);
        }
        session.close().await;
        stats.command_duration_ms = command_started.elapsed().as_millis() as u64;

        let entries = extract_entries(&profile, &raw);
        info!(host = %host, entries = entries.len(), "extraction finished");

        let paths = self
            .writer
            .write_host(&host, &entries)
            .await
            .map_err(|source| HarvestError::Persist {
                host: host.clone(),
                source,
            })?;

        stats.total_duration_ms = started.elapsed().as_millis() as u64;
        info!(host = %host, duration_ms = stats.total_duration_ms, "host collected");

        Ok(HarvestReport {
            hostname: host,
            entries,
            paths,
            stats,
        })
    }

    /// One bounded connect attempt, retried exactly once with rsa-sha2
    /// signatures disabled if the first attempt died in algorithm
    /// negotiation. Nothing else is retried.
    async fn connect_with_fallback(
        &self,
        config: &SessionConfig,
    ) -> Result<T::Session, ConnectError> {
        match self.connect_once(config).await {
            Err(err) if err.is_algorithm_negotiation() => {
                warn!(
                    host = %config.host,
                    error = %err,
                    "algorithm negotiation failed, retrying with rsa-sha2 signatures disabled"
                );
                self.connect_once(&config.with_rsa_sha2_disabled()).await
            }
            other => other,
        }
    }

    async fn connect_once(&self, config: &SessionConfig) -> Result<T::Session, ConnectError> {
        timeout(config.connect_timeout, self.transport.connect(config))
            .await
            .map_err(|_| ConnectError::Timeout(config.connect_timeout.as_secs()))?
    }
}
