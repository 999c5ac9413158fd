//! `relik-worker` -- ClamAV scan task entrypoint.
//!
//! Invoked by the task-queue runtime once per task. Logs go to stderr;
//! stdout carries only the command's output (the metadata document or
//! the encoded task result).
//!
//! # Environment variables
//!
//! | Variable                        | Required | Default                                   |
//! |---------------------------------|----------|-------------------------------------------|
//! | `CLAMSCAN_BIN`                  | no       | `clamscan`                                |
//! | `FRESHCLAM_BIN`                 | no       | `freshclam`                               |
//! | `CLAMAV_DEFAULT_DATABASE_PATHS` | no       | `/var/lib/clamav,/usr/local/share/clamav` |
//! | `RUST_LOG`                      | no       | `relik_worker=info,relik_clamav=info`     |
//!
//! # Exit codes
//!
//! `0` success, `1` task failure, `2` invalid input or usage (usage
//! errors are reported by clap).

use std::process::ExitCode;

use clap::Parser;
use relik_clamav::ClamavError;
use relik_core::process::SystemRunner;
use relik_worker::commands::{self, Cli, WorkerCommand};
use relik_worker::config::WorkerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relik_worker=info,relik_clamav=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = Cli::parse().command;

    match &command {
        WorkerCommand::Metadata => {
            println!("{}", commands::metadata_document());
            ExitCode::SUCCESS
        }
        WorkerCommand::Run { .. } => {
            let config = WorkerConfig::from_env();
            tracing::info!(
                clamscan = %config.clamav.clamscan_bin,
                freshclam = %config.clamav.freshclam_bin,
                "Starting relik-worker",
            );

            match commands::run_from_input(&SystemRunner, &config, command.input_path()).await {
                Ok(encoded) => {
                    println!("{encoded}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!(error = %format!("{e:#}"), "Task failed");
                    let invalid_input = e
                        .downcast_ref::<ClamavError>()
                        .is_some_and(ClamavError::is_invalid_input);
                    ExitCode::from(if invalid_input { 2 } else { 1 })
                }
            }
        }
    }
}
