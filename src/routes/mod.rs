mod health;
mod logs;
mod summary;
mod validation;
mod words;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::welcome))
        .nest("/health", health::router())
        .route("/api/word", get(words::get_word).fallback(fallback_handler))
        .route(
            "/api/validate-sentence",
            post(validation::validate_sentence).fallback(fallback_handler),
        )
        .route("/api/summary", get(summary::get_summary).fallback(fallback_handler))
        .route("/api/today-log", get(logs::get_today_logs).fallback(fallback_handler))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("Route not found").into_response()
}
