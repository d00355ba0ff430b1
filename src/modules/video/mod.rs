use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

pub mod dto;
pub mod handler;
pub mod keys;
pub mod model;
pub mod repository;
pub mod service;

#[cfg(test)]
pub mod testing;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/videos/{id}", get(handler::get_video))
        .route("/videos/{id}/video", post(handler::upload_video))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth::auth_middleware,
        ))
}
