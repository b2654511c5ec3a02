use crate::state::AppState;
use axum::Router;
use axum::routing::post;

pub mod dto;
pub mod events;
pub mod handler;
pub mod model;
pub mod reconcile;
pub mod repository;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        post(handler::submit_job).fallback(handler::method_not_allowed),
    )
}
