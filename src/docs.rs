use utoipa::OpenApi;
use crate::modules::video::dto::VideoResponse;
use crate::modules::video::model::Video;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::video::handler::get_video,
        crate::modules::video::handler::upload_video,
    ),
    components(
        schemas(Video, VideoResponse)
    ),
    tags(
        (name = "Videos", description = "Video upload and playback")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

use utoipa::Modify;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
