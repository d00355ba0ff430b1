use std::io;
use std::path::Path;

use axum::extract::multipart::{Field, MultipartError};
use futures_util::TryStreamExt;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

use crate::common::error::IngestError;

const COPY_CHUNK: usize = 64 * 1024;

/// A private temporary file that is removed when dropped, on every exit path.
#[derive(Debug)]
pub struct TempArtifact {
    label: &'static str,
    path: TempPath,
}

impl TempArtifact {
    pub fn create(dir: &Path, label: &'static str) -> io::Result<Self> {
        let path = tempfile::Builder::new()
            .prefix(&format!("tubely-{label}-"))
            .suffix(".mp4")
            .tempfile_in(dir)?
            .into_temp_path();

        debug!(label, path = %path.display(), "created temp artifact");
        Ok(Self { label, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        // TempPath removes the file right after this.
        debug!(label = self.label, path = %self.path.display(), "releasing temp artifact");
    }
}

/// Copies `body` into `artifact`, failing once more than `limit` bytes arrive.
pub async fn stage_body<R>(
    mut body: R,
    artifact: &TempArtifact,
    limit: u64,
) -> Result<u64, IngestError>
where
    R: AsyncRead + Unpin,
{
    let mut file = File::create(artifact.path())
        .await
        .map_err(|e| IngestError::Processing(e.into()))?;

    let mut buf = vec![0u8; COPY_CHUNK];
    let mut written = 0u64;

    loop {
        let n = body.read(&mut buf).await.map_err(|e| {
            warn!(error = %e, "upload body interrupted");
            IngestError::client("Unable to read uploaded file")
        })?;
        if n == 0 {
            break;
        }

        written += n as u64;
        if written > limit {
            return Err(IngestError::PayloadTooLarge { limit });
        }

        file.write_all(&buf[..n])
            .await
            .map_err(|e| IngestError::Processing(e.into()))?;
    }

    file.flush()
        .await
        .map_err(|e| IngestError::Processing(e.into()))?;
    file.sync_all()
        .await
        .map_err(|e| IngestError::Processing(e.into()))?;

    Ok(written)
}

/// Adapts a multipart field into a byte reader.
pub fn field_reader<'a>(field: Field<'a>) -> impl AsyncRead + Unpin + Send + 'a {
    StreamReader::new(Box::pin(
        field.map_err(|e: MultipartError| io::Error::other(e.body_text())),
    ))
}
