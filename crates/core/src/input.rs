//! Input file resolution.
//!
//! A task receives its inputs from two places: the encoded result of the
//! previous pipeline stage (`pipe_result`) and an explicit file list. The
//! upstream result is untrusted -- an empty, truncated or otherwise
//! undecodable payload is skipped rather than failing the task.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A file reference handed to a task.
///
/// Only `path` is mandatory; upstream stages attach whatever else they know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    pub path: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl InputFile {
    pub fn new(path: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
            uuid: None,
            data_type: None,
            extension: None,
        }
    }
}

/// Encoded result(s) of the previous pipeline stage.
///
/// Group tasks fan in several upstream results, so the runtime may pass
/// either a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipeResult {
    Single(String),
    Many(Vec<String>),
}

impl PipeResult {
    fn encoded(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::Many(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

/// Only `output_files` matters when consuming an upstream result.
#[derive(Debug, Deserialize)]
struct UpstreamEnvelope {
    #[serde(default)]
    output_files: Vec<InputFile>,
}

/// Decode one upstream result into the files it produced.
///
/// Returns `None` for blank input or anything that is not base64-encoded
/// UTF-8 JSON carrying an `output_files` list.
pub fn decode_pipe_result(encoded: &str) -> Option<Vec<InputFile>> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return None;
    }

    let bytes = match STANDARD.decode(encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping pipe result: not valid base64");
            return None;
        }
    };

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping pipe result: not valid UTF-8");
            return None;
        }
    };

    if text.trim().is_empty() {
        tracing::debug!("Skipping pipe result: decoded payload is empty");
        return None;
    }

    match serde_json::from_str::<UpstreamEnvelope>(&text) {
        Ok(envelope) => Some(envelope.output_files),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping pipe result: not a task result object");
            None
        }
    }
}

/// Merge upstream output files with the explicit input list.
///
/// Upstream files come first, in the order the results were given,
/// followed by `input_files` unchanged.
pub fn get_input_files(
    pipe_result: Option<&PipeResult>,
    input_files: Vec<InputFile>,
) -> Vec<InputFile> {
    let mut files: Vec<InputFile> = pipe_result
        .map(|pr| {
            pr.encoded()
                .into_iter()
                .filter_map(decode_pipe_result)
                .flatten()
                .collect()
        })
        .unwrap_or_default();

    files.extend(input_files);
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        STANDARD.encode(json.as_bytes())
    }

    #[test]
    fn decodes_output_files_from_upstream_result() {
        let encoded = encode(
            r#"{"output_files": [{"path": "/data/a.bin", "display_name": "a.bin", "uuid": "abc"}], "workflow_id": "wf"}"#,
        );
        let files = decode_pipe_result(&encoded).expect("should decode");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "/data/a.bin");
        assert_eq!(files[0].display_name, "a.bin");
        assert_eq!(files[0].uuid.as_deref(), Some("abc"));
    }

    #[test]
    fn blank_pipe_result_is_skipped() {
        assert!(decode_pipe_result("").is_none());
        assert!(decode_pipe_result("   \n").is_none());
        assert!(decode_pipe_result(&encode("  ")).is_none());
    }

    #[test]
    fn garbage_pipe_result_is_skipped() {
        assert!(decode_pipe_result("%%% not base64 %%%").is_none());
        assert!(decode_pipe_result(&encode("not json")).is_none());
        assert!(decode_pipe_result(&STANDARD.encode([0xff, 0xfe, 0xfd])).is_none());
    }

    #[test]
    fn missing_output_files_yields_empty_list() {
        let files = decode_pipe_result(&encode(r#"{"workflow_id": "wf"}"#)).expect("object");
        assert!(files.is_empty());
    }

    #[test]
    fn merges_upstream_before_explicit_inputs() {
        let upstream = PipeResult::Many(vec![
            encode(r#"{"output_files": [{"path": "/up/1"}]}"#),
            String::new(),
            encode(r#"{"output_files": [{"path": "/up/2"}]}"#),
        ]);
        let files = get_input_files(Some(&upstream), vec![InputFile::new("/explicit", "explicit")]);
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["/up/1", "/up/2", "/explicit"]);
    }

    #[test]
    fn no_pipe_result_passes_inputs_through() {
        let files = get_input_files(None, vec![InputFile::new("/x", "x")]);
        assert_eq!(files, vec![InputFile::new("/x", "x")]);
    }

    #[test]
    fn pipe_result_accepts_string_or_list() {
        let single: PipeResult = serde_json::from_str(r#""abc""#).expect("string");
        assert_eq!(single, PipeResult::Single("abc".into()));
        let many: PipeResult = serde_json::from_str(r#"["a", "b"]"#).expect("list");
        assert_eq!(many, PipeResult::Many(vec!["a".into(), "b".into()]));
    }
}
