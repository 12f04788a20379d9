use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use arp_harvester::config::HarvestConfig;
use arp_harvester::executor::HarvestRunner;
use arp_harvester::harvest::HarvestPipeline;
use arp_harvester::model::HostTarget;
use arp_harvester::report::ReportWriter;
use arp_harvester::transport::ssh::SshTransport;
use arp_harvester::vendor::VendorKind;

#[derive(Parser)]
#[command(
    name = "arp-harvester",
    version,
    about = "Collect and parse ARP tables from huawei, cisco and mikrotik devices"
)]
struct Cli {
    /// Device platform to harvest
    #[arg(short = 't', long = "type", value_enum)]
    vendor: VendorKind,

    /// Username for login
    #[arg(short, long)]
    user: String,

    /// Path to a private key file; the local ssh-agent is used when omitted
    #[arg(short = 'i', long)]
    key: Option<PathBuf>,

    /// Hosts to collect from, as `hostname` or `hostname:port`
    #[arg(short = 'H', long = "hosts", num_args = 1.., required = true)]
    hosts: Vec<HostTarget>,

    /// Also store the captured ip/mac pairs as JSON
    #[arg(long)]
    store_json: bool,

    /// Directory receiving the per-host reports
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Log verbosity
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn init_logging(level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let writer = ReportWriter::new(cli.results_dir, cli.store_json);
    if let Err(err) = writer.prepare().await {
        error!(error = %err, "cannot prepare results directory");
        return ExitCode::FAILURE;
    }

    let config = HarvestConfig::new(cli.vendor, cli.user, cli.key);
    let pipeline = HarvestPipeline::new(SshTransport, writer);
    let runner = HarvestRunner::new(pipeline, config);

    let summary = runner.run(&cli.hosts).await;
    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        interrupted = summary.interrupted,
        "harvest run finished"
    );

    if summary.failed() > 0 || summary.interrupted {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
