use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod middleware;
mod modules;
mod routes;
mod state;

use crate::config::settings::{AppConfig, PipelineConfig};
use crate::infrastructure::db::pool::{connect_to_db, run_migrations};
use crate::infrastructure::media::{FfmpegRewriter, FfprobeInspector};
use crate::infrastructure::storage::StorageService;
use crate::modules::video::repository::VideoRepository;
use crate::modules::video::service::VideoService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tubely=debug")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new()?;
    tokio::fs::create_dir_all(&config.upload_temp_dir).await?;

    let db = connect_to_db(&config.database_url).await?;
    run_migrations(&db).await?;

    let tool_timeout = config.media_tool_timeout();
    let videos = VideoService::new(
        PipelineConfig::from(&config),
        Arc::new(VideoRepository::new(db)),
        Arc::new(StorageService::new(&config)),
        Arc::new(FfmpegRewriter::new(config.ffmpeg_bin.clone(), tool_timeout)),
        Arc::new(FfprobeInspector::new(config.ffprobe_bin.clone(), tool_timeout)),
    );

    let addr = format!("0.0.0.0:{}", config.server_port);
    let app = app::create_app(AppState::new(config, videos));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
