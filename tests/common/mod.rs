#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;

use hogword_backend::auth::sign_jwt_hs256;
use hogword_backend::create_app;
use hogword_backend::db::MemoryPracticeStore;
use hogword_backend::services::practice::PracticeService;
use hogword_backend::services::scoring::{GatewayError, ScoringGateway, ScoringResult};
use hogword_backend::services::vocabulary::{Vocabulary, WordSelector};
use hogword_backend::state::AppState;

pub const SECRET: &str = "test-secret";

/// Gateway that answers every call with the same verdict, or fails.
pub struct ScriptedGateway {
    verdict: Option<ScoringResult>,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn scoring(score: f64) -> Self {
        Self {
            verdict: Some(ScoringResult {
                score: Some(score),
                level: Some("B1".to_string()),
                suggestion: Some("Nice use of the word.".to_string()),
                corrected_sentence: None,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            verdict: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringGateway for ScriptedGateway {
    async fn score(&self, _word: &str, sentence: &str) -> Result<ScoringResult, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.verdict {
            Some(verdict) => Ok(ScoringResult {
                corrected_sentence: Some(sentence.to_string()),
                ..verdict.clone()
            }),
            None => Err(GatewayError::HttpStatus {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "scoring backend exploded".to_string(),
            }),
        }
    }
}

/// One word per tier, so the tier can be read off the word.
pub fn tiny_vocabulary() -> Vocabulary {
    Vocabulary::from_json(r#"{"beginner": ["cat"], "intermediate": ["dog"], "advanced": ["fox"]}"#)
        .unwrap()
}

pub fn tier_of(word: &str) -> &'static str {
    match word {
        "cat" => "beginner",
        "dog" => "intermediate",
        "fox" => "advanced",
        other => panic!("unexpected word {other}"),
    }
}

pub fn practice_service(
    store: Arc<MemoryPracticeStore>,
    gateway: Arc<ScriptedGateway>,
) -> PracticeService {
    PracticeService::new(
        store,
        WordSelector::new(Arc::new(tiny_vocabulary())),
        gateway,
    )
}

pub fn create_test_app(store: Arc<MemoryPracticeStore>, gateway: Arc<ScriptedGateway>) -> Router {
    let state = AppState::new(
        practice_service(store, gateway),
        Some(SECRET.to_string()),
        false,
    );
    create_app(state, &[])
}

pub fn bearer(user_id: &str) -> String {
    let token = sign_jwt_hs256(user_id, SECRET, Duration::hours(1)).unwrap();
    format!("Bearer {token}")
}

pub fn get(uri: &str, user_id: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(user_id))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, user_id: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(user_id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
