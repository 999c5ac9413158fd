//! Signature database refresh via `freshclam`.
//!
//! A mirror or database directory override is passed through a temporary
//! config file. The file lives only as long as the [`NamedTempFile`]
//! handle, so it is removed on every exit path, including failures.

use std::io::Write;
use std::path::Path;

use relik_core::process::{render_command, CommandRunner};
use tempfile::NamedTempFile;

use crate::error::ClamavError;

/// Render the directives for a freshclam config file, or `None` when
/// there is nothing to override.
pub fn freshclam_config_contents(database_paths: &[String], mirror: Option<&str>) -> Option<String> {
    let mut lines = Vec::new();

    if let Some(mirror) = mirror.map(str::trim).filter(|m| !m.is_empty()) {
        lines.push(format!("DatabaseMirror {mirror}"));
    }

    if let Some(dir) = database_paths.iter().find(|p| Path::new(p).is_dir()) {
        lines.push(format!("DatabaseDirectory {dir}"));
    }

    if lines.is_empty() {
        return None;
    }

    Some(lines.join("\n") + "\n")
}

/// Write the freshclam config to a fresh temporary `.conf` file.
pub fn build_freshclam_config(
    database_paths: &[String],
    mirror: Option<&str>,
) -> Result<Option<NamedTempFile>, ClamavError> {
    let Some(contents) = freshclam_config_contents(database_paths, mirror) else {
        return Ok(None);
    };

    let mut file = tempfile::Builder::new()
        .prefix("freshclam-")
        .suffix(".conf")
        .tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;

    Ok(Some(file))
}

/// Run `freshclam` and return the command line that was executed.
///
/// Any non-zero exit is fatal for the task.
pub async fn update_signatures<R: CommandRunner>(
    runner: &R,
    freshclam_bin: &str,
    database_paths: &[String],
    mirror: Option<&str>,
) -> Result<String, ClamavError> {
    let config_file = build_freshclam_config(database_paths, mirror)?;

    let mut argv = vec![
        freshclam_bin.to_string(),
        "--stdout".to_string(),
        "--foreground".to_string(),
    ];
    if let Some(file) = &config_file {
        argv.push("--config-file".to_string());
        argv.push(file.path().to_string_lossy().into_owned());
    }

    let command = render_command(&argv);
    tracing::info!(command = %command, "Updating ClamAV signatures");

    let output = runner.run(&argv).await.map_err(|source| ClamavError::Spawn {
        program: freshclam_bin.to_string(),
        source,
    })?;

    if output.exit_code != 0 {
        tracing::error!(
            exit_code = output.exit_code,
            detail = %output.detail(),
            "Signature update failed",
        );
        return Err(ClamavError::SignatureUpdateFailed {
            exit_code: output.exit_code,
            detail: output.detail().to_string(),
        });
    }

    tracing::info!("Signature update complete");
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_contains_mirror_and_first_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_file = dir.path().join("main.cvd");
        std::fs::write(&db_file, b"cvd").expect("write db file");
        let db_dir = dir.path().join("db");
        std::fs::create_dir(&db_dir).expect("mkdir");

        let paths = vec![
            db_file.to_string_lossy().into_owned(),
            db_dir.to_string_lossy().into_owned(),
        ];
        let file = build_freshclam_config(&paths, Some("database.clamav.net"))
            .expect("build config")
            .expect("config file should be created");

        assert!(file.path().to_string_lossy().ends_with(".conf"));
        let content = std::fs::read_to_string(file.path()).expect("read config");
        assert_eq!(
            content,
            format!(
                "DatabaseMirror database.clamav.net\nDatabaseDirectory {}\n",
                db_dir.display()
            )
        );
    }

    #[test]
    fn no_overrides_means_no_file() {
        assert!(build_freshclam_config(&[], None).expect("build").is_none());
        assert!(build_freshclam_config(&[], Some("   ")).expect("build").is_none());
        assert!(
            build_freshclam_config(&["/missing/dir".to_string()], None)
                .expect("build")
                .is_none()
        );
    }

    #[test]
    fn mirror_only() {
        let content = freshclam_config_contents(&[], Some(" mirror.local ")).expect("content");
        assert_eq!(content, "DatabaseMirror mirror.local\n");
    }

    #[test]
    fn config_file_removed_on_drop() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let paths = vec![dir.path().to_string_lossy().into_owned()];
        let file = build_freshclam_config(&paths, None)
            .expect("build")
            .expect("file");
        let path = file.path().to_path_buf();
        assert!(path.exists());
        drop(file);
        assert!(!path.exists());
    }
}
