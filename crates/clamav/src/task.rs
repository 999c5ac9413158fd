//! The ClamAV scan task.
//!
//! One invocation runs linearly:
//! 1. Resolve input files and scan options.
//! 2. Optionally refresh signatures with `freshclam`.
//! 3. Scan every existing input path with `clamscan`, one at a time.
//! 4. Write the raw output and findings artifacts.
//! 5. Return the task result for the runtime to encode.
//!
//! A fatal tool failure aborts before step 4, so a failed task never
//! leaves partial artifacts behind.

use std::path::{Path, PathBuf};

use relik_core::input::{get_input_files, InputFile, PipeResult};
use relik_core::output::{create_output_file, OutputFile};
use relik_core::process::CommandRunner;
use relik_core::task_config::TaskConfig;
use relik_core::task_result::TaskResult;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{ClamavSettings, ScanOptions};
use crate::error::ClamavError;
use crate::freshclam;
use crate::scan::{self, Finding};

pub const RAW_OUTPUT_NAME: &str = "clamav_stdout.txt";
pub const RAW_OUTPUT_DATA_TYPE: &str = "text/plain";
pub const FINDINGS_NAME: &str = "clamav_results.json";
pub const FINDINGS_DATA_TYPE: &str = "openrelik:clamav:findings";

/// Separator between commands in the result's command trail.
const COMMAND_JOINER: &str = " && ";

/// Arguments the task-queue runtime passes to the task.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskInvocation {
    #[serde(default)]
    pub pipe_result: Option<PipeResult>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_files: Vec<InputFile>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_config: TaskConfig,
}

/// The runtime sends `null` for arguments the caller left out.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Contents of the findings artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub database_paths: Vec<String>,
    pub signatures_updated: bool,
    pub scanned_paths: Vec<String>,
}

/// Summary attached to the task result as `meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMeta {
    pub infected_count: usize,
    pub database_paths: Vec<String>,
    pub scanned_count: usize,
}

impl From<&ScanReport> for ScanMeta {
    fn from(report: &ScanReport) -> Self {
        Self {
            infected_count: report.findings.len(),
            database_paths: report.database_paths.clone(),
            scanned_count: report.scanned_paths.len(),
        }
    }
}

/// Raw-output artifact body: one line per entry, newline-terminated.
pub fn render_raw_output(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    lines.join("\n") + "\n"
}

/// Run a ClamAV scan task end to end.
pub async fn run_scan_task<R: CommandRunner>(
    runner: &R,
    settings: &ClamavSettings,
    invocation: TaskInvocation,
) -> Result<TaskResult, ClamavError> {
    let TaskInvocation {
        pipe_result,
        input_files,
        output_path,
        workflow_id,
        task_config,
    } = invocation;

    let input_files = get_input_files(pipe_result.as_ref(), input_files);
    if input_files.is_empty() {
        return Err(ClamavError::NoInputFiles);
    }

    let scan_paths = existing_paths(&input_files);
    if scan_paths.is_empty() {
        return Err(ClamavError::NoValidInputPaths);
    }

    let output_dir = output_path.ok_or(ClamavError::MissingOutputPath)?;

    let options = ScanOptions::resolve(&task_config, settings);
    let base_command = options.base_scan_command(&settings.clamscan_bin);

    tracing::info!(
        workflow_id = workflow_id.as_deref().unwrap_or(""),
        inputs = input_files.len(),
        scannable = scan_paths.len(),
        database_paths = ?options.database_paths,
        update_signatures = options.update_signatures,
        "Starting ClamAV scan",
    );

    let mut commands = Vec::with_capacity(scan_paths.len() + 1);

    if options.update_signatures {
        let command = freshclam::update_signatures(
            runner,
            &settings.freshclam_bin,
            &options.database_paths,
            options.freshclam_mirror.as_deref(),
        )
        .await?;
        commands.push(command);
    }

    let mut findings = Vec::new();
    let mut raw_lines = Vec::new();

    for path in &scan_paths {
        let output = scan::scan_path(runner, &base_command, path).await?;
        commands.push(output.command);
        raw_lines.extend(output.raw_lines);
        findings.extend(output.findings);
    }

    let report = ScanReport {
        findings,
        database_paths: options.database_paths.clone(),
        signatures_updated: options.update_signatures,
        scanned_paths: scan_paths,
    };

    let output_files = write_artifacts(&output_dir, &raw_lines, &report).await?;
    let meta = serde_json::to_value(ScanMeta::from(&report))?;

    tracing::info!(
        infected = report.findings.len(),
        scanned = report.scanned_paths.len(),
        "ClamAV scan finished",
    );

    Ok(TaskResult::new(
        output_files,
        workflow_id,
        Some(commands.join(COMMAND_JOINER)),
        meta,
    ))
}

/// Input paths that exist right now, in input order.
///
/// Missing paths are skipped silently apart from a log line.
fn existing_paths(input_files: &[InputFile]) -> Vec<String> {
    input_files
        .iter()
        .filter(|file| {
            let exists = !file.path.is_empty() && Path::new(&file.path).exists();
            if !exists {
                tracing::warn!(path = %file.path, "Skipping input that does not exist");
            }
            exists
        })
        .map(|file| file.path.clone())
        .collect()
}

async fn write_artifacts(
    output_dir: &Path,
    raw_lines: &[String],
    report: &ScanReport,
) -> Result<Vec<OutputFile>, ClamavError> {
    let raw_body = render_raw_output(raw_lines);
    let findings_body = serde_json::to_string_pretty(report)?;

    let artifacts = vec![
        (
            create_output_file(output_dir, RAW_OUTPUT_NAME, RAW_OUTPUT_DATA_TYPE),
            raw_body,
        ),
        (
            create_output_file(output_dir, FINDINGS_NAME, FINDINGS_DATA_TYPE),
            findings_body,
        ),
    ];
    write_all_or_none(artifacts).await
}

/// Write each file in order. If any write fails, the files already
/// written are removed before the error is returned.
async fn write_all_or_none(
    artifacts: Vec<(OutputFile, String)>,
) -> Result<Vec<OutputFile>, ClamavError> {
    let mut written: Vec<OutputFile> = Vec::with_capacity(artifacts.len());
    for (file, body) in artifacts {
        if let Err(e) = file.write(body).await {
            for done in &written {
                if let Err(rm) = tokio::fs::remove_file(&done.path).await {
                    tracing::warn!(
                        path = %done.path,
                        error = %rm,
                        "Failed to remove partial artifact",
                    );
                }
            }
            return Err(e.into());
        }
        written.push(file);
    }
    Ok(written)
}
