//! Wrappers around the external media tools used during ingestion.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

pub mod error;
pub mod faststart;
pub mod ffmpeg;
pub mod ffprobe;
pub mod geometry;

pub use error::{MediaError, MediaResult};
pub use ffmpeg::FfmpegRewriter;
pub use ffprobe::FfprobeInspector;
pub use geometry::{GeometryCategory, VideoDimensions};

/// Relocates container metadata to the front of the file without touching samples.
#[async_trait]
pub trait ContainerRewriter: Send + Sync {
    /// Writes the rewritten container to `output`, which already exists and may be overwritten.
    async fn rewrite(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// Reads stream metadata from a video file.
#[async_trait]
pub trait StreamInspector: Send + Sync {
    /// Dimensions of the first video stream.
    async fn inspect(&self, path: &Path) -> MediaResult<VideoDimensions>;
}

/// Runs a tool to completion under `limit`, killing it if the deadline passes.
pub(crate) async fn run_tool(
    program: &str,
    mut command: Command,
    limit: Duration,
) -> MediaResult<Output> {
    command
        .kill_on_drop(true)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(tool = program, ?limit, "spawning media tool");

    let output = match timeout(limit, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MediaError::ToolNotFound(program.to_string()));
        }
        Ok(Err(e)) => return Err(MediaError::Io(e)),
        Err(_) => {
            return Err(MediaError::Timeout {
                tool: program.to_string(),
                secs: limit.as_secs(),
            });
        }
    };

    if !output.status.success() {
        return Err(MediaError::tool_failed(program, &output.stderr, output.status.code()));
    }

    Ok(output)
}
