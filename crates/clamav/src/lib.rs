//! ClamAV malware scan task.
//!
//! Refreshes signatures with `freshclam`, scans each input with
//! `clamscan`, and reports detections as a findings artifact alongside
//! the raw scanner output.

pub mod config;
pub mod error;
pub mod freshclam;
pub mod metadata;
pub mod scan;
pub mod task;

pub use config::{ClamavSettings, ScanOptions};
pub use error::ClamavError;
pub use metadata::{task_metadata, TASK_NAME};
pub use scan::Finding;
pub use task::{run_scan_task, ScanMeta, ScanReport, TaskInvocation};
