use std::path::Path;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use time::OffsetDateTime;
use tracing::{debug, info};

use super::{ObjectStore, SignedUrl, StorageError, StorageResult};
use crate::config::settings::AppConfig;

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
}

impl StorageService {
    pub fn new(config: &AppConfig) -> Self {
        let credentials = Credentials::new(
            &config.s3_access_key,
            &config.s3_secret_key,
            None,
            None,
            "static",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.s3_endpoint {
            // Custom endpoints (MinIO) need path-style addressing.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        info!(region = %config.s3_region, "✅ S3 client configured");

        Self { client }
    }

    pub async fn presign_get_at(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
        issued_at: SystemTime,
    ) -> StorageResult<SignedUrl> {
        let presign_config = PresigningConfig::builder()
            .start_time(issued_at)
            .expires_in(ttl)
            .build()
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(DisplayErrorContext(e).to_string()))?;

        Ok(SignedUrl {
            url: presigned.uri().to_string(),
            expires_at: OffsetDateTime::from(issued_at + ttl),
        })
    }
}

#[async_trait]
impl ObjectStore for StorageService {
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()> {
        let len = tokio::fs::metadata(path).await?.len();
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(DisplayErrorContext(e).to_string()))?;

        debug!(bucket, key, len, "uploaded object");
        Ok(())
    }

    async fn presign_get(&self, bucket: &str, key: &str, ttl: Duration) -> StorageResult<SignedUrl> {
        self.presign_get_at(bucket, key, ttl, SystemTime::now()).await
    }
}
