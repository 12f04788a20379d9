//! Per-host report rendering and persistence.
//!
//! One text report per host, overwritten on every run, plus an optional JSON
//! dump of the raw pairs. Files are written to a temp path and renamed into
//! place so an interrupted run never leaves a half-written report.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::debug;

use crate::mac::{colon_mac, dot_mac, hyphen_mac};
use crate::model::ArpEntry;

/// Errors while persisting results.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to create results directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode '{}': {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Paths produced for one host.
#[derive(Debug, Clone)]
pub struct WrittenPaths {
    pub report: PathBuf,
    pub structured: Option<PathBuf>,
}

/// Renders the text report: timestamp header, a separator of 80 `=`, one
/// line per entry with the MAC in all three notations, and a trailing blank
/// line. Zero entries still produce the header and separator.
pub fn render_report(entries: &[ArpEntry], timestamp: DateTime<Local>) -> String {
    let mut report = String::new();
    report.push_str(&format!("{} \n", timestamp.format("%d-%m-%Y %H:%M:%S")));
    report.push_str(&"=".repeat(80));
    report.push('\n');

    for entry in entries {
        report.push_str(&format!(
            "{} {} {} - {:<15} {}\n",
            colon_mac(&entry.mac),
            hyphen_mac(&entry.mac),
            dot_mac(&entry.mac),
            entry.ip,
            entry.ip.replace('.', "-")
        ));
    }

    report.push('\n');
    report
}

/// Writes per-host result files under one results directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    results_dir: PathBuf,
    store_json: bool,
}

impl ReportWriter {
    pub fn new(results_dir: PathBuf, store_json: bool) -> Self {
        Self {
            results_dir,
            store_json,
        }
    }

    /// Creates the results directory; an already existing directory is fine.
    pub async fn prepare(&self) -> Result<(), ReportError> {
        tokio::fs::create_dir_all(&self.results_dir)
            .await
            .map_err(|source| ReportError::CreateDir {
                path: self.results_dir.clone(),
                source,
            })
    }

    /// Writes `macs-<hostname>.txt` and, when enabled, `<hostname>.json`.
    pub async fn write_host(
        &self,
        hostname: &str,
        entries: &[ArpEntry],
    ) -> Result<WrittenPaths, ReportError> {
        let report_path = self.results_dir.join(format!("macs-{hostname}.txt"));
        let body = render_report(entries, Local::now());
        write_atomic(&report_path, body.as_bytes()).await?;
        debug!(path = %report_path.display(), "stored report");

        let structured = if self.store_json {
            let json_path = self.results_dir.join(format!("{hostname}.json"));
            let body = serde_json::to_vec(entries).map_err(|source| ReportError::Encode {
                path: json_path.clone(),
                source,
            })?;
            write_atomic(&json_path, &body).await?;
            debug!(path = %json_path.display(), "stored json dump");
            Some(json_path)
        } else {
            None
        };

        Ok(WrittenPaths {
            report: report_path,
            structured,
        })
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|source| ReportError::Write {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(ip: &str, mac: &str) -> ArpEntry {
        ArpEntry {
            ip: ip.to_string(),
            mac: mac.to_string(),
        }
    }

    fn fixed_timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 13, 5, 9).unwrap()
    }

    // Unique subdir per test to avoid collisions
    fn test_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "arp_harvester_{}_{}_{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos()
        ))
    }

    #[test]
    fn test_render_report_line_format() {
        let report = render_report(&[entry("10.0.0.5", "00aa.11bb.22cc")], fixed_timestamp());

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "01-03-2024 13:05:09 ");
        assert_eq!(lines[1], "=".repeat(80));
        assert_eq!(
            lines[2],
            "00:aa:11:bb:22:cc 00-aa-11-bb-22-cc 00aa.11bb.22cc - 10.0.0.5        10-0-0-5"
        );
        assert!(report.ends_with("\n\n"));
    }

    #[test]
    fn test_render_report_empty_entries() {
        let report = render_report(&[], fixed_timestamp());
        assert_eq!(report, format!("01-03-2024 13:05:09 \n{}\n\n", "=".repeat(80)));
    }

    #[test]
    fn test_render_report_preserves_entry_order() {
        let report = render_report(
            &[
                entry("192.168.88.10", "00:aa:11:bb:22:cc"),
                entry("192.168.88.2", "00:aa:11:bb:22:dd"),
            ],
            fixed_timestamp(),
        );

        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[2].contains("192-168-88-10"));
        assert!(lines[3].contains("192-168-88-2"));
    }

    #[tokio::test]
    async fn test_write_host_without_json() {
        let dir = test_dir("txt_only");
        let writer = ReportWriter::new(dir.clone(), false);
        writer.prepare().await.unwrap();

        let paths = writer
            .write_host("sw1", &[entry("10.0.0.5", "00aa.11bb.22cc")])
            .await
            .unwrap();

        assert_eq!(paths.report, dir.join("macs-sw1.txt"));
        assert!(paths.structured.is_none());

        let body = tokio::fs::read_to_string(&paths.report).await.unwrap();
        assert!(body.contains("00:aa:11:bb:22:cc"));
        assert!(!dir.join("sw1.json").exists());

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_write_host_with_json() {
        let dir = test_dir("with_json");
        let writer = ReportWriter::new(dir.clone(), true);
        writer.prepare().await.unwrap();

        let entries = vec![entry("10.0.0.5", "00aa.11bb.22cc")];
        let paths = writer.write_host("sw1", &entries).await.unwrap();

        let json_path = paths.structured.unwrap();
        assert_eq!(json_path, dir.join("sw1.json"));

        let body = tokio::fs::read_to_string(&json_path).await.unwrap();
        let back: Vec<ArpEntry> = serde_json::from_str(&body).unwrap();
        assert_eq!(back, entries);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_write_host_overwrites_previous_run() {
        let dir = test_dir("overwrite");
        let writer = ReportWriter::new(dir.clone(), false);
        writer.prepare().await.unwrap();

        writer
            .write_host("sw1", &[entry("10.0.0.5", "00aa.11bb.22cc")])
            .await
            .unwrap();
        let paths = writer.write_host("sw1", &[]).await.unwrap();

        let body = tokio::fs::read_to_string(&paths.report).await.unwrap();
        assert!(!body.contains("00:aa:11:bb:22:cc"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_prepare_accepts_existing_directory() {
        let dir = test_dir("existing");
        std::fs::create_dir_all(&dir).unwrap();

        let writer = ReportWriter::new(dir.clone(), false);
        assert!(writer.prepare().await.is_ok());

        std::fs::remove_dir_all(dir).ok();
    }
}
