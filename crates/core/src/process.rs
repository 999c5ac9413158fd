//! External command execution.
//!
//! Tasks wrap command-line tools. [`CommandRunner`] is the seam between a
//! task and the processes it spawns: production code uses
//! [`SystemRunner`], tests substitute a recording fake. Exit codes are
//! returned to the caller rather than interpreted here, since tools
//! disagree on what a non-zero status means.

use std::process::Stdio;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Characters that never need quoting in a POSIX shell word.
fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c)
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Diagnostic text for error messages: stderr, or stdout when the tool
    /// reports errors there instead.
    pub fn detail(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Runs an argument vector (`argv[0]` is the program) to completion.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        argv: &[String],
    ) -> impl std::future::Future<Output = std::io::Result<CommandOutput>> + Send;
}

/// Spawns real child processes via `tokio::process`.
///
/// No timeout is applied; the task-queue runtime owns time limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, argv: &[String]) -> std::io::Result<CommandOutput> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command")
        })?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let start = Instant::now();

        // Drain both pipes concurrently so a chatty stderr cannot block stdout.
        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let (status, stdout_bytes, stderr_bytes) = tokio::join!(
            child.wait(),
            read_stream(stdout_handle),
            read_stream(stderr_handle),
        );
        let status = status?;
        let (stdout_bytes, stderr_bytes) = (stdout_bytes?, stderr_bytes?);

        let exit_code = status.code().unwrap_or(-1);
        tracing::debug!(
            program = %program,
            exit_code,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Command finished",
        );

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
        })
    }
}

/// Read an output stream to EOF. Nothing is truncated.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        h.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Quote one argument for a POSIX shell.
pub fn shell_quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    if arg.chars().all(is_shell_safe) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r#"'"'"'"#))
}

/// Render an argument vector as a copy-pasteable shell command line.
pub fn render_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}
