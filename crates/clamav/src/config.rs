//! Scan configuration resolution.
//!
//! Turns the loosely-typed task configuration into the flags and
//! signature database paths handed to `clamscan` and `freshclam`.

use std::collections::HashSet;
use std::path::Path;

use relik_core::task_config::TaskConfig;

use crate::metadata::{
    OPT_ALLMATCH, OPT_DATABASE_PATHS, OPT_DETECT_PUA, OPT_FRESHCLAM_MIRROR, OPT_RECURSIVE,
    OPT_UPDATE_SIGNATURES,
};

/// Signature database locations used by distribution packages and
/// source builds respectively.
pub const DEFAULT_DATABASE_PATHS: &[&str] = &["/var/lib/clamav", "/usr/local/share/clamav"];

pub const DEFAULT_CLAMSCAN_BIN: &str = "clamscan";
pub const DEFAULT_FRESHCLAM_BIN: &str = "freshclam";

/// Host-level settings, fixed for the lifetime of the worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClamavSettings {
    pub clamscan_bin: String,
    pub freshclam_bin: String,
    /// Appended after user-configured database paths.
    pub default_database_paths: Vec<String>,
}

impl Default for ClamavSettings {
    fn default() -> Self {
        Self {
            clamscan_bin: DEFAULT_CLAMSCAN_BIN.to_string(),
            freshclam_bin: DEFAULT_FRESHCLAM_BIN.to_string(),
            default_database_paths: DEFAULT_DATABASE_PATHS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Per-invocation options, resolved from the task configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub recursive: bool,
    pub update_signatures: bool,
    pub allmatch: bool,
    pub detect_pua: bool,
    pub freshclam_mirror: Option<String>,
    /// Existing database paths, user entries first, deduplicated.
    pub database_paths: Vec<String>,
}

impl ScanOptions {
    /// Resolve options against the filesystem as it is right now.
    pub fn resolve(config: &TaskConfig, settings: &ClamavSettings) -> Self {
        Self {
            recursive: config.flag(OPT_RECURSIVE, true),
            update_signatures: config.flag(OPT_UPDATE_SIGNATURES, true),
            allmatch: config.flag(OPT_ALLMATCH, true),
            detect_pua: config.flag(OPT_DETECT_PUA, true),
            freshclam_mirror: config.optional_text(OPT_FRESHCLAM_MIRROR),
            database_paths: resolve_database_paths(
                &config.text(OPT_DATABASE_PATHS),
                &settings.default_database_paths,
            ),
        }
    }

    /// `clamscan` argv up to, but not including, the scan target.
    pub fn base_scan_command(&self, clamscan_bin: &str) -> Vec<String> {
        let mut argv = vec![
            clamscan_bin.to_string(),
            "--infected".to_string(),
            "--no-summary".to_string(),
        ];

        if self.recursive {
            argv.push("--recursive".to_string());
        }
        if self.allmatch {
            argv.push("--allmatch".to_string());
        }
        if self.detect_pua {
            argv.push("--detect-pua".to_string());
        }

        for db_path in &self.database_paths {
            argv.push("--database".to_string());
            argv.push(db_path.clone());
        }

        argv
    }
}

/// Split user-configured database paths and keep the ones that exist.
///
/// Entries are separated by newlines or commas. User entries come first in
/// the order given, then `defaults`. Deduplication is by exact string, so
/// `/var/lib/clamav/` and `/var/lib/clamav` are distinct entries.
pub fn resolve_database_paths(configured: &str, defaults: &[String]) -> Vec<String> {
    let normalized = configured.replace(',', "\n");
    let entries = normalized
        .lines()
        .map(str::trim)
        .filter(|entry| !entry.is_empty());

    let mut seen = HashSet::new();
    let mut existing = Vec::new();

    for candidate in entries.chain(defaults.iter().map(String::as_str)) {
        if !seen.insert(candidate) {
            continue;
        }
        if Path::new(candidate).exists() {
            existing.push(candidate.to_string());
        } else {
            tracing::debug!(path = candidate, "Skipping missing ClamAV database path");
        }
    }

    existing
}
