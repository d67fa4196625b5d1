use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Local;
use tracing::error;

use super::{render_report, AppState};

/// Body of every failed report request; details only go to the log.
pub const GENERIC_ERROR: &str = "An error occurred while fetching headlines.";

/// GET /top-headlines
pub async fn top_headlines(State(state): State<AppState>) -> Response {
    let today = Local::now().date_naive();
    match state.repository.enriched_on(today).await {
        Ok(articles) => Html(render_report(&articles)).into_response(),
        Err(e) => {
            error!(error = %e, "Error fetching headlines");
            (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR).into_response()
        }
    }
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
