//! Sequential host-queue executor.
//!
//! Hosts are processed one at a time, in the order supplied. A host's
//! failure is recorded and the queue moves on; an operator interrupt
//! abandons the in-flight host and drops the rest of the queue. Each host
//! runs as an isolated task returning a result, so the loop could be
//! parallelized later without touching the pipeline.

use tracing::{error, info, warn};

use crate::config::HarvestConfig;
use crate::harvest::{HarvestError, HarvestPipeline, HarvestReport};
use crate::model::HostTarget;
use crate::transport::DeviceTransport;

/// What happened to one host.
pub struct HostOutcome {
    pub hostname: String,
    pub result: Result<HarvestReport, HarvestError>,
}

/// Aggregated results of one run.
pub struct RunSummary {
    pub outcomes: Vec<HostOutcome>,
    /// True when the operator interrupted the run before the queue drained.
    pub interrupted: bool,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Drives the harvest pipeline over a queue of hosts.
pub struct HarvestRunner<T: DeviceTransport> {
    pipeline: HarvestPipeline<T>,
    config: HarvestConfig,
}

impl<T: DeviceTransport> HarvestRunner<T> {
    pub fn new(pipeline: HarvestPipeline<T>, config: HarvestConfig) -> Self {
        Self { pipeline, config }
    }

    /// Processes `targets` in order, isolating per-host failures.
    pub async fn run(&self, targets: &[HostTarget]) -> RunSummary {
        let mut outcomes = Vec::with_capacity(targets.len());
        let mut interrupted = false;

        for target in targets {
            let session_config = self.config.session_config(target);

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    warn!(host = %target.hostname, "interrupt received, abandoning remaining hosts");
                    interrupted = true;
                    break;
                }
                result = self.pipeline.harvest(&session_config, self.config.vendor) => {
                    match &result {
                        Ok(report) => {
                            info!(
                                host = %target.hostname,
                                entries = report.entries.len(),
                                "host successfully collected"
                            );
                        }
                        Err(err) => {
                            error!(host = %target.hostname, error = %err, "host failed");
                        }
                    }
                    outcomes.push(HostOutcome {
                        hostname: target.hostname.clone(),
                        result,
                    });
                }
            }
        }

        RunSummary {
            outcomes,
            interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::report::ReportWriter;
    use crate::transport::{
        CommandError, ConnectError, DeviceSession, DeviceTransport, SessionConfig,
    };
    use crate::vendor::VendorKind;

    struct CannedSession {
        output: String,
    }

    #[async_trait]
    impl DeviceSession for CannedSession {
        async fn run(&mut self, _command: &str) -> Result<String, CommandError> {
            Ok(std::mem::take(&mut self.output))
        }

        async fn close(&mut self) {}
    }

    struct QueueTransport {
        script: Mutex<VecDeque<Result<CannedSession, ConnectError>>>,
    }

    #[async_trait]
    impl DeviceTransport for QueueTransport {
        type Session = CannedSession;

        async fn connect(&self, _config: &SessionConfig) -> Result<CannedSession, ConnectError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected connect attempt")
        }
    }

    fn test_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "arp_harvester_executor_{}_{}_{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_failed_host_does_not_stop_the_queue() {
        let transport = QueueTransport {
            script: Mutex::new(VecDeque::from([
                Err(ConnectError::Other("no route to host".to_string())),
                Ok(CannedSession {
                    output: "0  192.168.88.10  00:aa:11:bb:22:cc\n".to_string(),
                }),
            ])),
        };
        let dir = test_dir("isolation");
        let pipeline = HarvestPipeline::new(transport, ReportWriter::new(dir.clone(), false));
        let config = HarvestConfig {
            vendor: VendorKind::MikrotikRouteros,
            username: "admin".to_string(),
            key_path: None,
            connect_timeout: Duration::from_secs(5),
        };

        let targets: Vec<HostTarget> =
            vec!["r1".parse().unwrap(), "r2".parse().unwrap()];
        let summary = HarvestRunner::new(pipeline, config).run(&targets).await;

        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.succeeded(), 1);
        assert!(!summary.interrupted);
        assert!(summary.outcomes[0].result.is_err());
        assert_eq!(summary.outcomes[1].hostname, "r2");
        assert!(dir.join("macs-r2.txt").exists());
        assert!(!dir.join("macs-r1.txt").exists());

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_empty_target_list_is_a_noop() {
        let transport = QueueTransport {
            script: Mutex::new(VecDeque::new()),
        };
        let dir = test_dir("noop");
        let pipeline = HarvestPipeline::new(transport, ReportWriter::new(dir.clone(), false));
        let config = HarvestConfig {
            vendor: VendorKind::Cisco,
            username: "admin".to_string(),
            key_path: None,
            connect_timeout: Duration::from_secs(5),
        };

        let summary = HarvestRunner::new(pipeline, config).run(&[]).await;
        assert!(summary.outcomes.is_empty());
        assert_eq!(summary.succeeded(), 0);
        assert_eq!(summary.failed(), 0);

        std::fs::remove_dir_all(dir).ok();
    }
}
