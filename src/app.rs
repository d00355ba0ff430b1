use axum::Router;
use axum::extract::DefaultBodyLimit;
use crate::state::AppState;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 16 * 1024;

pub fn create_app(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    crate::routes::configure_routes(state.clone())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::AppConfig;
    use crate::middleware::auth::TokenClaims;
    use crate::modules::video::testing::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    const BOUNDARY: &str = "tubely-test-boundary";

    fn app(harness: &Harness, max_upload_bytes: u64) -> Router {
        let mut config = AppConfig::for_tests();
        config.max_upload_bytes = max_upload_bytes;
        create_app(AppState::new(config, harness.service.clone()))
    }

    fn token(user_id: Uuid) -> String {
        let exp = (time::OffsetDateTime::now_utc().unix_timestamp() + 3600) as usize;
        encode(
            &Header::default(),
            &TokenClaims { sub: user_id, exp },
            &EncodingKey::from_secret(AppConfig::for_tests().jwt_secret.as_bytes()),
        )
        .unwrap()
    }

    fn multipart(content_type: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"clip.mp4\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(video_id: Uuid, bearer: Option<String>, body: Vec<u8>) -> Request<Body> {
        let mut builder = Request::post(format!("/api/v1/videos/{video_id}/video"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::CONTENT_LENGTH, body.len());
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn landscape_harness() -> (Harness, crate::modules::video::model::Video) {
        let video = sample_video(Uuid::new_v4());
        let harness = Harness::new(video.clone(), CopyRewriter::default(), FixedInspector::sized(1920, 1080));
        (harness, video)
    }

    #[tokio::test]
    async fn health_check() {
        let (harness, _) = landscape_harness();
        let response = app(&harness, 1 << 20)
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn upload_requires_token() {
        let (harness, video) = landscape_harness();
        let response = app(&harness, 1 << 20)
            .oneshot(upload(video.id, None, multipart("video/mp4", b"clip")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(harness.store.keys().is_empty());
    }

    #[tokio::test]
    async fn upload_rejects_tampered_token() {
        let (harness, video) = landscape_harness();
        let forged = format!("{}x", token(video.user_id));
        let response = app(&harness, 1 << 20)
            .oneshot(upload(video.id, Some(forged), multipart("video/mp4", b"clip")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn upload_by_other_user_is_forbidden() {
        let (harness, video) = landscape_harness();
        let response = app(&harness, 1 << 20)
            .oneshot(upload(video.id, Some(token(Uuid::new_v4())), multipart("video/mp4", b"clip")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(harness.store.keys().is_empty());
        assert_eq!(harness.leftover_files(), 0);
    }

    #[tokio::test]
    async fn unsupported_media_type_is_bad_request() {
        let (harness, video) = landscape_harness();
        let response = app(&harness, 1 << 20)
            .oneshot(upload(video.id, Some(token(video.user_id)), multipart("video/x-matroska", b"clip")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Unsupported media type");
        assert!(harness.store.keys().is_empty());
        assert_eq!(harness.rewriter.calls(), 0);
    }

    #[tokio::test]
    async fn missing_video_field_is_bad_request() {
        let (harness, video) = landscape_harness();
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        )
        .into_bytes();
        let response = app(&harness, 1 << 20)
            .oneshot(upload(video.id, Some(token(video.user_id)), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_request_is_rejected_up_front() {
        let (harness, video) = landscape_harness();
        let payload = vec![0u8; 64 * 1024];
        let response = app(&harness, 1024)
            .oneshot(upload(video.id, Some(token(video.user_id)), multipart("video/mp4", &payload)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(harness.rewriter.calls(), 0);
        assert_eq!(harness.leftover_files(), 0);
    }

    #[tokio::test]
    async fn oversized_leading_field_is_payload_too_large() {
        let (harness, video) = landscape_harness();
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&vec![b'a'; 64 * 1024]);
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&multipart("video/mp4", b"clip"));

        // No Content-Length, so the limit only trips while the body streams.
        let request = Request::post(format!("/api/v1/videos/{}/video", video.id))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::AUTHORIZATION, format!("Bearer {}", token(video.user_id)))
            .body(Body::from(body))
            .unwrap();

        let response = app(&harness, 1024).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(harness.rewriter.calls(), 0);
        assert!(harness.store.keys().is_empty());
    }

    #[tokio::test]
    async fn owner_upload_returns_signed_video() {
        let (harness, video) = landscape_harness();
        let response = app(&harness, 1 << 20)
            .oneshot(upload(video.id, Some(token(video.user_id)), multipart("video/mp4", b"clip bytes")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["status"], "success");

        let url = body["data"]["video_url"].as_str().unwrap();
        assert!(url.starts_with(&format!("https://store.test/{BUCKET}/landscape/")));
        assert!(!body["data"]["video_url_expires_at"].is_null());

        let stored = harness.videos.stored(video.id).unwrap().video_url.unwrap();
        assert!(stored.starts_with(&format!("{BUCKET},landscape/")));
        assert!(stored.ends_with(".mp4"));
        assert_eq!(harness.leftover_files(), 0);
    }

    #[tokio::test]
    async fn get_video_signs_fresh_url() {
        let (harness, video) = landscape_harness();
        let mut stored = video.clone();
        stored.video_url = Some(format!("{BUCKET},portrait/abc.mp4"));
        harness.videos.insert(stored);

        let response = app(&harness, 1 << 20)
            .oneshot(
                Request::get(format!("/api/v1/videos/{}", video.id))
                    .header(header::AUTHORIZATION, format!("Bearer {}", token(video.user_id)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert!(body["data"]["video_url"]
            .as_str()
            .unwrap()
            .starts_with(&format!("https://store.test/{BUCKET}/portrait/abc.mp4")));
    }
}
