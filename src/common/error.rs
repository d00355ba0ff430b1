use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::common::response::ApiError;
use crate::infrastructure::media::MediaError;
use crate::infrastructure::storage::StorageError;

/// Failure classes of a video ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{0}")]
    ClientInput(String),

    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("You do not have permission to modify this video")]
    Forbidden,

    #[error("Video not found")]
    NotFound,

    #[error("processing failed: {0}")]
    Processing(#[from] MediaError),

    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata store failed: {0}")]
    Metadata(anyhow::Error),
}

impl IngestError {
    pub fn client(message: impl Into<String>) -> Self {
        Self::ClientInput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::ClientInput(_) => StatusCode::BAD_REQUEST,
            IngestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IngestError::Forbidden => StatusCode::FORBIDDEN,
            IngestError::NotFound => StatusCode::NOT_FOUND,
            IngestError::Processing(_) | IngestError::Storage(_) | IngestError::Metadata(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "video request failed");
            match self {
                IngestError::Processing(_) => "Couldn't process video",
                IngestError::Storage(_) => "Couldn't store video",
                _ => "Couldn't update video",
            }
            .to_string()
        } else {
            self.to_string()
        };

        ApiError(message, status).into_response()
    }
}
