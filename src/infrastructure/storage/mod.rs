//! Object store abstraction and the persisted pointer format.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

pub mod s3;

pub use s3::StorageService;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("presigning failed: {0}")]
    PresignFailed(String),

    #[error("invalid stored pointer: {0:?}")]
    InvalidPointer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A time-limited retrieval link. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: OffsetDateTime,
}

impl SignedUrl {
    pub fn is_valid_at(&self, at: OffsetDateTime) -> bool {
        at < self.expires_at
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads the file at `path` under `bucket`/`key` in one request.
    /// An error means nothing usable was stored.
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Signs a GET for `bucket`/`key` valid for `ttl` from now.
    async fn presign_get(&self, bucket: &str, key: &str, ttl: Duration) -> StorageResult<SignedUrl>;
}

/// Where an uploaded video lives, stored as `"<bucket>,<key>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPointer {
    pub bucket: String,
    pub key: String,
}

impl StoredPointer {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for StoredPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.bucket, self.key)
    }
}

impl FromStr for StoredPointer {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(bucket), Some(key), None) if !bucket.is_empty() && !key.is_empty() => {
                Ok(Self::new(bucket, key))
            }
            _ => Err(StorageError::InvalidPointer(s.to_string())),
        }
    }
}
