use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::model::Video;
use crate::infrastructure::db::pool::DbPool;
use crate::infrastructure::storage::StoredPointer;

/// Metadata store for video records.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>>;

    /// Overwrites only the playback pointer and returns the record as stored.
    async fn set_video_url(&self, id: Uuid, pointer: &StoredPointer) -> Result<Video>;
}

#[derive(Clone)]
pub struct VideoRepository {
    pool: DbPool,
}

impl VideoRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(video)
    }

    async fn set_video_url(&self, id: Uuid, pointer: &StoredPointer) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET video_url = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
            "#,
        )
        .bind(pointer.to_string())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        video.ok_or_else(|| anyhow::anyhow!("video {id} no longer exists"))
    }
}
