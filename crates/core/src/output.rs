//! Output file allocation.
//!
//! Output files are stored under a UUID-derived name inside the task's
//! output directory; the human-facing name travels separately as
//! `display_name`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// A file produced by a task, as reported in the task result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub uuid: String,
    pub display_name: String,
    pub extension: String,
    pub data_type: String,
    pub path: String,
    pub original_path: Option<String>,
    pub source_file_id: Option<i64>,
}

impl OutputFile {
    /// Write `contents` to the file, replacing anything already there.
    pub async fn write(&self, contents: impl AsRef<[u8]>) -> Result<(), CoreError> {
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }

    pub fn path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

/// Allocate a new output file in `output_dir`.
///
/// Nothing is created on disk; the caller writes the contents.
pub fn create_output_file(output_dir: &Path, display_name: &str, data_type: &str) -> OutputFile {
    let uuid = Uuid::new_v4().simple().to_string();
    let extension = Path::new(display_name)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = if extension.is_empty() {
        uuid.clone()
    } else {
        format!("{uuid}.{extension}")
    };

    OutputFile {
        path: output_dir.join(file_name).to_string_lossy().into_owned(),
        uuid,
        display_name: display_name.to_string(),
        extension,
        data_type: data_type.to_string(),
        original_path: None,
        source_file_id: None,
    }
}
