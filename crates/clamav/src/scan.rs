//! `clamscan` invocation and output parsing.

use relik_core::process::{render_command, CommandRunner};
use serde::{Deserialize, Serialize};

use crate::error::ClamavError;

/// Suffix clamscan appends to every detection line.
const FOUND_SUFFIX: &str = " FOUND";

/// Separator between the scanned path and the signature name.
const SIGNATURE_SEPARATOR: &str = ": ";

/// clamscan exit code when at least one file was infected.
const EXIT_VIRUS_FOUND: i32 = 1;

pub const STATUS_INFECTED: &str = "infected";

/// One detection reported by clamscan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub file_path: String,
    pub signature: String,
    pub status: String,
}

/// Result of scanning a single input path.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    /// The command line that was executed.
    pub command: String,
    /// Non-empty stdout lines, verbatim.
    pub raw_lines: Vec<String>,
    pub findings: Vec<Finding>,
}

/// Parse one line of clamscan output.
///
/// Only `<path>: <signature> FOUND` lines are detections. The path is
/// split at the last `": "`, so paths that themselves contain `": "`
/// survive intact.
pub fn parse_finding_line(line: &str) -> Option<Finding> {
    if !line.ends_with(FOUND_SUFFIX) {
        return None;
    }
    let Some((file_path, signature)) = line.rsplit_once(SIGNATURE_SEPARATOR) else {
        tracing::warn!(line, "Ignoring malformed clamscan detection line");
        return None;
    };

    Some(Finding {
        file_path: file_path.to_string(),
        signature: signature
            .strip_suffix(FOUND_SUFFIX)
            .unwrap_or(signature)
            .to_string(),
        status: STATUS_INFECTED.to_string(),
    })
}

/// Extract every detection from clamscan stdout.
pub fn parse_clamscan_output(output: &str) -> Vec<Finding> {
    output.lines().filter_map(parse_finding_line).collect()
}

/// Scan one path and parse the result.
///
/// Exit code `0` (clean) and `1` (infected) both succeed; anything else
/// aborts with the tool's diagnostics.
pub async fn scan_path<R: CommandRunner>(
    runner: &R,
    base_command: &[String],
    scan_path: &str,
) -> Result<ScanOutput, ClamavError> {
    let mut argv = base_command.to_vec();
    argv.push(scan_path.to_string());
    let command = render_command(&argv);

    tracing::info!(path = scan_path, "Scanning with clamscan");

    let program = argv.first().cloned().unwrap_or_default();
    let output = runner
        .run(&argv)
        .await
        .map_err(|source| ClamavError::Spawn { program, source })?;

    if output.exit_code > EXIT_VIRUS_FOUND || output.exit_code < 0 {
        tracing::error!(
            path = scan_path,
            exit_code = output.exit_code,
            detail = %output.detail(),
            "clamscan failed",
        );
        return Err(ClamavError::ScanFailed {
            path: scan_path.to_string(),
            exit_code: output.exit_code,
            detail: output.detail().to_string(),
        });
    }

    let raw_lines = output
        .stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    let findings = parse_clamscan_output(&output.stdout);

    tracing::info!(
        path = scan_path,
        exit_code = output.exit_code,
        infected = findings.len(),
        "Scan complete",
    );

    Ok(ScanOutput {
        command,
        raw_lines,
        findings,
    })
}
