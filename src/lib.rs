pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{MemoryPracticeStore, PgPracticeStore, PracticeStore, StoreError};
use crate::services::practice::PracticeService;
use crate::services::scoring::WebhookScoringGateway;
use crate::services::vocabulary::{Vocabulary, VocabularyError, WordSelector};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Wires the vocabulary, record store and scoring gateway described by `config`.
pub async fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let vocabulary = match config.vocabulary_path.as_deref() {
        Some(path) => Vocabulary::from_path(path)?,
        None => Vocabulary::bundled()?,
    };
    tracing::info!(words = vocabulary.len(), "vocabulary loaded");

    let (store, database_backed): (Arc<dyn PracticeStore>, bool) = match config.database_url.as_deref() {
        Some(url) => (Arc::new(PgPracticeStore::connect(url).await?), true),
        None => {
            tracing::warn!("DATABASE_URL not set, practice logs are kept in memory");
            (Arc::new(MemoryPracticeStore::new()), false)
        }
    };

    let gateway = WebhookScoringGateway::new(config.scoring_webhook_url.clone(), config.scoring_timeout);
    if !gateway.is_configured() {
        tracing::warn!("SCORING_WEBHOOK_URL not set, sentences get a placeholder score");
    }
    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET not set, authenticated routes will reject every request");
    }

    let practice = PracticeService::new(
        store,
        WordSelector::new(Arc::new(vocabulary)),
        Arc::new(gateway),
    );

    Ok(AppState::new(practice, config.jwt_secret.clone(), database_backed))
}

pub fn create_app(state: AppState, allowed_origins: &[String]) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}
