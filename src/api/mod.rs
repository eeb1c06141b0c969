use crate::state::AppState;
use crate::tracker::TrackerCommand;
use axum::Router;
use axum::routing::{get, post};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

pub mod handlers;
pub mod responses;

#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<RwLock<AppState>>,
    pub commands: mpsc::Sender<TrackerCommand>,
}

pub fn router(context: ApiContext) -> Router {
    Router::new()
        .route("/api/lot", get(handlers::get_lot))
        .route("/api/health", get(handlers::get_health))
        .route("/api/reset", post(handlers::post_reset))
        .with_state(context)
}
