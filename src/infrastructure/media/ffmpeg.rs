//! Faststart remux via the FFmpeg CLI.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::error::{MediaError, MediaResult};
use super::faststart::verify_progressive_file;
use super::{ContainerRewriter, run_tool};

#[derive(Debug, Clone)]
pub struct FfmpegRewriter {
    ffmpeg_bin: String,
    timeout: Duration,
}

impl FfmpegRewriter {
    pub fn new(ffmpeg_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            timeout,
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.ffmpeg_bin);
        command
            .args(["-y", "-hide_banner", "-v", "error", "-i"])
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(output);
        command
    }
}

#[async_trait]
impl ContainerRewriter for FfmpegRewriter {
    async fn rewrite(&self, input: &Path, output: &Path) -> MediaResult<()> {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        run_tool(&self.ffmpeg_bin, self.command(input, output), self.timeout).await?;

        verify_progressive_file(output).await?;
        debug!(output = %output.display(), "rewrote container for progressive playback");
        Ok(())
    }
}
