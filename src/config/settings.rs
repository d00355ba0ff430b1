use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::env::{self, EnvKey};

/// Upper bound on an uploaded video body (1 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1 << 30;

/// Validity window of signed playback URLs.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 60 * 60;

pub const DEFAULT_MEDIA_TOOL_TIMEOUT_SECS: u64 = 10 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub s3_bucket: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub max_upload_bytes: u64,
    pub signed_url_ttl_secs: u64,
    pub media_tool_timeout_secs: u64,
    pub upload_temp_dir: PathBuf,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
}

fn required(key: EnvKey) -> Result<String, ConfigError> {
    let name = key.as_str();
    env::get(key).map_err(|_| ConfigError::Missing(name))
}

/// Unset falls back to `default`; a value that is set but unparseable is an error.
fn parse_value<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{name} has unparseable value {raw:?}"))),
    }
}

fn parsed<T: FromStr>(key: EnvKey, default: T) -> Result<T, ConfigError> {
    let name = key.as_str();
    parse_value(name, env::get(key).ok(), default)
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Self {
            server_port: parsed(EnvKey::ServerPort, 3000)?,
            database_url: required(EnvKey::DatabaseUrl)?,
            jwt_secret: required(EnvKey::JwtSecret)?,
            s3_endpoint: env::get(EnvKey::S3Endpoint).ok(),
            s3_region: env::get_or(EnvKey::S3Region, "us-east-1"),
            s3_bucket: required(EnvKey::S3Bucket)?,
            s3_access_key: required(EnvKey::S3AccessKey)?,
            s3_secret_key: required(EnvKey::S3SecretKey)?,
            max_upload_bytes: parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES)?,
            signed_url_ttl_secs: parsed(EnvKey::SignedUrlTtlSecs, DEFAULT_SIGNED_URL_TTL_SECS)?,
            media_tool_timeout_secs: parsed(
                EnvKey::MediaToolTimeoutSecs,
                DEFAULT_MEDIA_TOOL_TIMEOUT_SECS,
            )?,
            upload_temp_dir: env::get(EnvKey::UploadTempDir)
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, "ffmpeg"),
            ffprobe_bin: env::get_or(EnvKey::FfprobeBin, "ffprobe"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Stored pointers are "<bucket>,<key>" with no escaping.
        if self.s3_bucket.is_empty() || self.s3_bucket.contains(',') {
            return Err(ConfigError::Invalid(format!(
                "bucket name {:?} must be non-empty and contain no comma",
                self.s3_bucket
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("MAX_UPLOAD_BYTES must be positive".to_string()));
        }
        if self.signed_url_ttl_secs == 0 {
            return Err(ConfigError::Invalid("SIGNED_URL_TTL_SECS must be positive".to_string()));
        }
        Ok(())
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    pub fn media_tool_timeout(&self) -> Duration {
        Duration::from_secs(self.media_tool_timeout_secs)
    }
}

/// Per-ingestion settings handed to the video service at construction.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub bucket: String,
    pub accepted_media_type: String,
    pub max_upload_bytes: u64,
    pub signed_url_ttl: Duration,
    pub temp_dir: PathBuf,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            bucket: config.s3_bucket.clone(),
            accepted_media_type: "video/mp4".to_string(),
            max_upload_bytes: config.max_upload_bytes,
            signed_url_ttl: config.signed_url_ttl(),
            temp_dir: config.upload_temp_dir.clone(),
        }
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        Self {
            server_port: 3000,
            database_url: "postgres://localhost/tubely".to_string(),
            jwt_secret: "test-secret".to_string(),
            s3_endpoint: None,
            s3_region: "us-east-1".to_string(),
            s3_bucket: "tubely-videos".to_string(),
            s3_access_key: "AKIDEXAMPLE".to_string(),
            s3_secret_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
            media_tool_timeout_secs: DEFAULT_MEDIA_TOOL_TIMEOUT_SECS,
            upload_temp_dir: std::env::temp_dir(),
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
        }
    }
}
