//! Vendor dialects and their ARP extraction profiles.
//!
//! Each supported device family is one [`VendorKind`] variant carrying the
//! commands that dump its ARP table and the pattern that pulls IP/MAC pairs
//! out of the resulting text. The enum is closed on purpose: adding a vendor
//! means adding a variant and one profile arm, and the compiler flags every
//! `match` that needs updating.

use std::fmt;

use clap::ValueEnum;
use regex::Regex;

/// Device families this harvester can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum VendorKind {
    Huawei,
    Cisco,
    #[value(name = "mikrotik_routeros")]
    MikrotikRouteros,
}

/// Commands plus extraction pattern for one vendor dialect.
///
/// The pattern carries two named captures: `ip` matches an IPv4 dotted quad
/// and `mac` a full 6-octet address in the vendor's native delimiter
/// convention.
#[derive(Debug, Clone)]
pub struct VendorProfile {
    pub commands: &'static [&'static str],
    pub pattern: Regex,
}

const HUAWEI_COMMANDS: &[&str] = &["mmi-mode enable", "display arp"];
const CISCO_COMMANDS: &[&str] = &["term len 0", "show arp"];
const MIKROTIK_COMMANDS: &[&str] =
    &["/ip/arp/print without-paging proplist=address,mac-address"];

// Huawei prints `xxxx-xxxx-xxxx`, cisco `xxxx.xxxx.xxxx`, and RouterOS the
// common `xx:xx:xx:xx:xx:xx` (older builds emit hyphens instead of colons).
const HUAWEI_PATTERN: &str =
    r"(?P<ip>\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}).*(?P<mac>[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4})";
const CISCO_PATTERN: &str =
    r"(?P<ip>\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}).*(?P<mac>[0-9A-Fa-f]{4}\.[0-9A-Fa-f]{4}\.[0-9A-Fa-f]{4})";
const MIKROTIK_PATTERN: &str =
    r"(?P<ip>\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}).*(?P<mac>([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2})";

impl VendorKind {
    /// Builds this vendor's harvest profile.
    pub fn profile(self) -> VendorProfile {
        let (commands, pattern) = match self {
            VendorKind::Huawei => (HUAWEI_COMMANDS, HUAWEI_PATTERN),
            VendorKind::Cisco => (CISCO_COMMANDS, CISCO_PATTERN),
            VendorKind::MikrotikRouteros => (MIKROTIK_COMMANDS, MIKROTIK_PATTERN),
        };

        VendorProfile {
            commands,
            pattern: Regex::new(pattern).expect("vendor pattern is valid"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VendorKind::Huawei => "huawei",
            VendorKind::Cisco => "cisco",
            VendorKind::MikrotikRouteros => "mikrotik_routeros",
        }
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
