//! Task result envelope returned to the task-queue runtime.
//!
//! The runtime stores the result as an opaque string and hands it to the
//! next stage as its `pipe_result`, so the wire form is base64-encoded JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::output::OutputFile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub output_files: Vec<OutputFile>,
    pub workflow_id: Option<String>,
    /// Every external command the task ran, joined with `" && "`.
    pub command: Option<String>,
    #[serde(default)]
    pub meta: Value,
    #[serde(default)]
    pub file_reports: Vec<Value>,
    #[serde(default)]
    pub task_files: Vec<Value>,
    #[serde(default)]
    pub task_report: Option<Value>,
}

impl TaskResult {
    pub fn new(
        output_files: Vec<OutputFile>,
        workflow_id: Option<String>,
        command: Option<String>,
        meta: Value,
    ) -> Self {
        Self {
            output_files,
            workflow_id,
            command,
            meta,
            file_reports: Vec::new(),
            task_files: Vec::new(),
            task_report: None,
        }
    }

    /// Encode as base64 JSON.
    pub fn encode(&self) -> Result<String, CoreError> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Inverse of [`encode`](Self::encode).
    pub fn decode(encoded: &str) -> Result<Self, CoreError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CoreError::Validation(format!("task result is not base64: {e}")))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
