//! Line-oriented extraction of IP/MAC pairs from raw command output.

use tracing::debug;

use crate::model::ArpEntry;
use crate::vendor::VendorProfile;

/// Scans `raw` line by line with the vendor's extraction pattern.
///
/// This is a best-effort scan, not a strict parse: lines that do not match
/// (banners, column headers, prompts) are skipped silently, and a line with
/// several candidate pairs contributes only the first match's captures.
/// Output containing no matching line at all yields an empty vector, which
/// is a valid result rather than an error.
pub fn extract_entries(profile: &VendorProfile, raw: &str) -> Vec<ArpEntry> {
    raw.lines()
        .filter_map(|line| {
            let caps = profile.pattern.captures(line)?;
            let entry = ArpEntry {
                ip: caps["ip"].to_string(),
                mac: caps["mac"].to_string(),
            };
            debug!(ip = %entry.ip, mac = %entry.mac, "parsed arp pair");
            Some(entry)
        })
        .collect()
}
