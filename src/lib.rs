//! arp-harvester - multi-vendor ARP table collection over SSH.
//!
//! This library provides:
//! - Vendor dialect profiles (commands + extraction patterns)
//! - MAC address normalization across colon, hyphen and dot notation
//! - A per-host harvest pipeline with an algorithm-negotiation fallback retry
//! - Report rendering and persistence

pub mod config;
pub mod executor;
pub mod extract;
pub mod harvest;
pub mod mac;
pub mod model;
pub mod report;
pub mod transport;
pub mod vendor;

// Re-export common types for convenience
pub use config::HarvestConfig;
pub use executor::{HarvestRunner, HostOutcome, RunSummary};
pub use harvest::{HarvestError, HarvestPipeline, HarvestReport, HarvestStats};
pub use model::{ArpEntry, HostTarget};
pub use report::{ReportError, ReportWriter};
pub use transport::{ssh::SshTransport, ConnectError, DeviceSession, DeviceTransport, SessionConfig};
pub use vendor::{VendorKind, VendorProfile};
