use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::modules::video::service::VideoService;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub videos: Arc<VideoService>,
}

impl AppState {
    pub fn new(config: AppConfig, videos: VideoService) -> Self {
        Self {
            config,
            videos: Arc::new(videos),
        }
    }
}
