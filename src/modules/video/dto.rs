use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

use super::model::Video;

/// A video as returned to clients: `video_url` holds a signed URL, never the stored pointer.
#[derive(Debug, Serialize, Clone, ToSchema)]
pub struct VideoResponse {
    #[serde(flatten)]
    pub video: Video,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub video_url_expires_at: Option<OffsetDateTime>,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        Self {
            video,
            video_url_expires_at: None,
        }
    }
}
