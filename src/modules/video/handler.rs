use crate::common::error::IngestError;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::common::upload::field_reader;
use crate::middleware::auth::TokenClaims;
use crate::modules::video::dto::VideoResponse;
use crate::modules::video::service::UploadRequest;
use crate::state::AppState;
use axum::{
    Extension,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use tracing::info;
use uuid::Uuid;

const VIDEO_FIELD: &str = "video";

#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video with a signed playback URL", body = ApiResponse<VideoResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Video not found")
    ),
    tag = "Videos",
    security(("bearer_auth" = []))
)]
pub async fn get_video(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
) -> Result<ApiSuccess<VideoResponse>, IngestError> {
    let video = state.videos.get_video(id, claims.sub).await?;
    Ok(ApiSuccess::ok(video, "Video retrieved successfully"))
}

/// Upload Video
/// Stages the `video` part, rewrites it for progressive playback and stores it
#[utoipa::path(
    post,
    path = "/api/v1/videos/{id}/video",
    params(("id" = Uuid, Path, description = "Video ID")),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload successful", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Video not found"),
        (status = 413, description = "Upload too large"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Videos",
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<ApiSuccess<VideoResponse>, IngestError> {
    let limit = state.config.max_upload_bytes;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        info!(video_id = %id, file_name = ?field.file_name(), ?content_type, "received video upload");

        let request = UploadRequest {
            video_id: id,
            caller_id: claims.sub,
            content_type,
            body: field_reader(field),
        };
        let video = state.videos.upload_video(request).await?;

        return Ok(ApiSuccess::ok(video, "Video uploaded successfully"));
    }

    Err(IngestError::client("No video field found in multipart request"))
}

fn multipart_error(e: MultipartError, limit: u64) -> IngestError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return IngestError::PayloadTooLarge { limit };
    }
    IngestError::client(format!("Unable to parse form file: {}", e.body_text()))
}
