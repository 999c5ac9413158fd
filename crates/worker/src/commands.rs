//! Worker commands.
//!
//! `metadata` prints the task registration so the platform can render
//! its configuration form; `run` executes one task invocation handed
//! over by the task-queue runtime.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use relik_clamav::{run_scan_task, task_metadata, TaskInvocation, TASK_NAME};
use relik_core::process::CommandRunner;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

use crate::config::WorkerConfig;

#[derive(Debug, Parser)]
#[command(name = "relik-worker", version, about = "ClamAV scan task worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: WorkerCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum WorkerCommand {
    /// Print the task registration document
    Metadata,
    /// Run one task invocation
    Run {
        /// Invocation JSON file; stdin when omitted or `-`
        input: Option<PathBuf>,
    },
}

impl WorkerCommand {
    /// Invocation file for `run`, `None` meaning stdin.
    pub fn input_path(&self) -> Option<&Path> {
        match self {
            Self::Run { input: Some(path) } if path.as_os_str() != "-" => Some(path.as_path()),
            _ => None,
        }
    }
}

/// Task registration document.
pub fn metadata_document() -> Value {
    json!({
        "task_name": TASK_NAME,
        "metadata": task_metadata(),
    })
}

/// Parse a task invocation from JSON text.
pub fn parse_invocation(text: &str) -> anyhow::Result<TaskInvocation> {
    serde_json::from_str(text).context("invalid task invocation JSON")
}

async fn read_invocation(input: Option<&Path>) -> anyhow::Result<TaskInvocation> {
    let text = match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read invocation from stdin")?;
            buf
        }
    };
    parse_invocation(&text)
}

/// Execute one invocation and return the encoded task result.
pub async fn run_invocation<R: CommandRunner>(
    runner: &R,
    config: &WorkerConfig,
    invocation: TaskInvocation,
) -> anyhow::Result<String> {
    let result = run_scan_task(runner, &config.clamav, invocation).await?;
    Ok(result.encode()?)
}

/// Read an invocation from `input` (or stdin) and run it.
pub async fn run_from_input<R: CommandRunner>(
    runner: &R,
    config: &WorkerConfig,
    input: Option<&Path>,
) -> anyhow::Result<String> {
    let invocation = read_invocation(input).await?;
    run_invocation(runner, config, invocation).await
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn parse(args: &[&str]) -> Result<WorkerCommand, clap::Error> {
        Cli::try_parse_from(std::iter::once("relik-worker").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse(&["metadata"]).unwrap(), WorkerCommand::Metadata);
        assert_eq!(parse(&["run"]).unwrap(), WorkerCommand::Run { input: None });
        assert_eq!(
            parse(&["run", "/tmp/job.json"]).unwrap(),
            WorkerCommand::Run {
                input: Some(PathBuf::from("/tmp/job.json"))
            }
        );
    }

    #[test]
    fn dash_and_missing_input_read_stdin() {
        assert_eq!(parse(&["run"]).unwrap().input_path(), None);
        assert_eq!(parse(&["run", "-"]).unwrap().input_path(), None);
        assert_eq!(parse(&["metadata"]).unwrap().input_path(), None);
        assert_eq!(
            parse(&["run", "job.json"]).unwrap().input_path(),
            Some(Path::new("job.json"))
        );
    }

    #[test]
    fn rejects_unknown_commands() {
        assert_matches!(parse(&[]), Err(_));
        assert_matches!(parse(&["scan"]), Err(_));
        assert_matches!(parse(&["run", "a", "b"]), Err(_));
    }

    #[test]
    fn help_is_reported_as_display_help() {
        let err = parse(&["run", "--help"]).expect_err("help exits early");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn metadata_document_carries_task_name() {
        let doc = metadata_document();
        assert_eq!(doc["task_name"], TASK_NAME);
        assert_eq!(doc["metadata"]["display_name"], "ClamAV scan");
        assert_eq!(doc["metadata"]["task_config"].as_array().map(Vec::len), Some(6));
    }

    #[test]
    fn invalid_invocation_json_is_an_error() {
        assert!(parse_invocation("not json").is_err());
        assert!(parse_invocation(r#"{"input_files": 3}"#).is_err());
    }
}
