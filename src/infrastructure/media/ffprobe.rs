//! FFprobe stream inspection.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use super::error::{MediaError, MediaResult};
use super::geometry::VideoDimensions;
use super::{StreamInspector, run_tool};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Extracts the first video stream's dimensions from `ffprobe -print_format json` output.
pub fn parse_dimensions(stdout: &[u8]) -> MediaResult<VideoDimensions> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or(MediaError::NoVideoStream)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if height > 0 => Ok(VideoDimensions::new(width, height)),
        (width, height) => Err(MediaError::InvalidDimensions {
            width: width.unwrap_or(0),
            height: height.unwrap_or(0),
        }),
    }
}

#[derive(Debug, Clone)]
pub struct FfprobeInspector {
    ffprobe_bin: String,
    timeout: Duration,
}

impl FfprobeInspector {
    pub fn new(ffprobe_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_bin: ffprobe_bin.into(),
            timeout,
        }
    }
}

#[async_trait]
impl StreamInspector for FfprobeInspector {
    async fn inspect(&self, path: &Path) -> MediaResult<VideoDimensions> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let mut command = Command::new(&self.ffprobe_bin);
        command
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path);

        let output = run_tool(&self.ffprobe_bin, command, self.timeout).await?;
        parse_dimensions(&output.stdout)
    }
}
