mod handlers;
mod report;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::db::Repository;

pub use report::render_report;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<Repository>,
}

pub fn router(repository: Arc<Repository>) -> Router {
    Router::new()
        .route("/top-headlines", get(handlers::top_headlines))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { repository })
}
