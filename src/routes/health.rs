use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    timestamp: String,
    uptime: u64,
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    uptime: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
}

pub async fn welcome() -> Response {
    Json(WelcomeResponse {
        message: "Welcome to Hogword API",
    })
    .into_response()
}

async fn root(State(state): State<AppState>) -> Response {
    let store = state.store();
    let reachable = match store.ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "store health check failed");
            false
        }
    };

    let database = match (reachable, state.database_backed()) {
        (false, _) => "disconnected",
        (true, true) => "connected",
        (true, false) => "memory",
    };

    let response = HealthResponse {
        status: if reachable { "ok" } else { "degraded" },
        database,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.uptime_seconds(),
    };

    let status_code = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn live(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "healthy",
        uptime: state.uptime_seconds(),
    })
}
