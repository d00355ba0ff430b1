use std::sync::Arc;

use mime::Mime;
use tokio::io::AsyncRead;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::VideoResponse;
use super::keys::StorageKey;
use super::model::Video;
use super::repository::VideoStore;
use crate::common::error::IngestError;
use crate::common::upload::{TempArtifact, stage_body};
use crate::config::settings::PipelineConfig;
use crate::infrastructure::media::{ContainerRewriter, GeometryCategory, StreamInspector};
use crate::infrastructure::storage::{ObjectStore, StoredPointer};

/// An upload whose caller has already been authenticated.
pub struct UploadRequest<R> {
    pub video_id: Uuid,
    pub caller_id: Uuid,
    pub content_type: Option<String>,
    pub body: R,
}

#[derive(Clone)]
pub struct VideoService {
    config: PipelineConfig,
    videos: Arc<dyn VideoStore>,
    storage: Arc<dyn ObjectStore>,
    rewriter: Arc<dyn ContainerRewriter>,
    inspector: Arc<dyn StreamInspector>,
}

impl VideoService {
    pub fn new(
        config: PipelineConfig,
        videos: Arc<dyn VideoStore>,
        storage: Arc<dyn ObjectStore>,
        rewriter: Arc<dyn ContainerRewriter>,
        inspector: Arc<dyn StreamInspector>,
    ) -> Self {
        Self {
            config,
            videos,
            storage,
            rewriter,
            inspector,
        }
    }

    async fn owned_video(&self, video_id: Uuid, caller_id: Uuid) -> Result<Video, IngestError> {
        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(IngestError::Metadata)?
            .ok_or(IngestError::NotFound)?;

        if video.user_id != caller_id {
            return Err(IngestError::Forbidden);
        }
        Ok(video)
    }

    fn accepted_media_type(&self, declared: Option<&str>) -> Result<Mime, IngestError> {
        let declared = declared
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| IngestError::client("Couldn't find media type"))?;

        let media_type: Mime = declared
            .parse()
            .map_err(|_| IngestError::client("Couldn't parse media type"))?;

        if media_type.essence_str() != self.config.accepted_media_type {
            return Err(IngestError::client("Unsupported media type"));
        }
        Ok(media_type)
    }

    /// Runs one ingestion: stage, faststart + classify, upload, record pointer, sign.
    ///
    /// Both temp artifacts are dropped before this returns, whatever the outcome.
    #[instrument(skip_all, fields(video_id = %request.video_id))]
    pub async fn upload_video<R>(&self, request: UploadRequest<R>) -> Result<VideoResponse, IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.owned_video(request.video_id, request.caller_id).await?;
        let media_type = self.accepted_media_type(request.content_type.as_deref())?;

        let staged = TempArtifact::create(&self.config.temp_dir, "upload")
            .map_err(|e| IngestError::Processing(e.into()))?;
        let size = stage_body(request.body, &staged, self.config.max_upload_bytes).await?;
        info!(size, "staged upload");

        let rewritten = TempArtifact::create(&self.config.temp_dir, "faststart")
            .map_err(|e| IngestError::Processing(e.into()))?;

        // Both read the staged bytes only; the rewrite never changes dimensions.
        let ((), dimensions) = tokio::try_join!(
            self.rewriter.rewrite(staged.path(), rewritten.path()),
            self.inspector.inspect(staged.path()),
        )?;
        let category = GeometryCategory::from_dimensions(dimensions)?;

        let key = StorageKey::derive(category);
        info!(%key, width = dimensions.width, height = dimensions.height, "classified upload");

        self.storage
            .put_file(
                &self.config.bucket,
                key.as_str(),
                rewritten.path(),
                media_type.essence_str(),
            )
            .await?;

        let pointer = StoredPointer::new(&self.config.bucket, key.as_str());
        let video = match self.videos.set_video_url(request.video_id, &pointer).await {
            Ok(video) => video,
            Err(e) => {
                warn!(%pointer, error = %e, "object stored without a video record pointing at it");
                return Err(IngestError::Metadata(e));
            }
        };

        drop(rewritten);
        drop(staged);

        info!(%pointer, "video uploaded");
        self.sign_video(video).await
    }

    pub async fn get_video(&self, video_id: Uuid, caller_id: Uuid) -> Result<VideoResponse, IngestError> {
        let video = self.owned_video(video_id, caller_id).await?;
        self.sign_video(video).await
    }

    /// Swaps the stored pointer for a freshly signed URL. Nothing is persisted.
    pub async fn sign_video(&self, mut video: Video) -> Result<VideoResponse, IngestError> {
        let Some(raw) = video.video_url.clone() else {
            return Ok(video.into());
        };

        let pointer = match raw.parse::<StoredPointer>() {
            Ok(pointer) => pointer,
            Err(e) => {
                warn!(video_id = %video.id, error = %e, "video has an unusable pointer");
                return Ok(video.into());
            }
        };

        let signed = self
            .storage
            .presign_get(&pointer.bucket, &pointer.key, self.config.signed_url_ttl)
            .await?;

        video.video_url = Some(signed.url);
        Ok(VideoResponse {
            video,
            video_url_expires_at: Some(signed.expires_at),
        })
    }
}
