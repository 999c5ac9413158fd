use relik_core::error::CoreError;

/// Errors that abort a ClamAV scan task.
///
/// An infection is not an error: `clamscan` exiting with `1` is the normal
/// positive-detection signal and is reported through findings instead.
#[derive(Debug, thiserror::Error)]
pub enum ClamavError {
    #[error("No input files provided")]
    NoInputFiles,

    #[error("No valid input paths were found to scan")]
    NoValidInputPaths,

    #[error("No output path provided")]
    MissingOutputPath,

    #[error("freshclam failed with code {exit_code}: {detail}")]
    SignatureUpdateFailed { exit_code: i32, detail: String },

    #[error("clamscan failed for {path} with code {exit_code}: {detail}")]
    ScanFailed {
        path: String,
        exit_code: i32,
        detail: String,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClamavError {
    /// The task was handed nothing it could scan, as opposed to the
    /// engine or the host failing.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::NoInputFiles | Self::NoValidInputPaths | Self::MissingOutputPath
        )
    }
}
