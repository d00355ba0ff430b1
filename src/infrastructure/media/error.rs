use std::path::PathBuf;
use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

/// Failures of the external media tools or of the files they produce.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found")]
    ToolNotFound(String),

    #[error("{tool} exited with {exit_code:?}: {stderr}")]
    ToolFailed {
        tool: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("{tool} timed out after {secs} seconds")]
    Timeout { tool: String, secs: u64 },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("invalid video dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    pub fn tool_failed(tool: impl Into<String>, stderr: &[u8], exit_code: Option<i32>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
            exit_code,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContainer(message.into())
    }
}
