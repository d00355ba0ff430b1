use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq, ToSchema)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Stored as `"<bucket>,<key>"`; replaced by a signed URL in responses.
    pub video_url: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub created_at: OffsetDateTime,
    #[schema(value_type = String, format = Date)]
    pub updated_at: OffsetDateTime,
}
