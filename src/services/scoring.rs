use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const NOT_CONFIGURED_LEVEL: &str = "Unknown";
const NOT_CONFIGURED_SUGGESTION: &str = "not configured";

/// Verdict returned by the scoring webhook. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScoringResult {
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub corrected_sentence: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScoringRequest<'a> {
    word: &'a str,
    user: &'a str,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait ScoringGateway: Send + Sync {
    async fn score(&self, word: &str, sentence: &str) -> Result<ScoringResult, GatewayError>;
}

/// Posts `{word, user}` to an external webhook and returns its verdict.
/// Without an endpoint it answers with a fixed placeholder instead.
#[derive(Clone)]
pub struct WebhookScoringGateway {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl WebhookScoringGateway {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.filter(|v| !v.trim().is_empty()),
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn not_configured(sentence: &str) -> ScoringResult {
        ScoringResult {
            score: Some(0.0),
            level: Some(NOT_CONFIGURED_LEVEL.to_string()),
            suggestion: Some(NOT_CONFIGURED_SUGGESTION.to_string()),
            corrected_sentence: Some(sentence.to_string()),
        }
    }
}

#[async_trait]
impl ScoringGateway for WebhookScoringGateway {
    async fn score(&self, word: &str, sentence: &str) -> Result<ScoringResult, GatewayError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            tracing::debug!("scoring webhook not configured, returning placeholder");
            return Ok(Self::not_configured(sentence));
        };

        let payload = ScoringRequest {
            word,
            user: sentence,
        };
        let resp = self.client.post(endpoint).json(&payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(?status, "scoring webhook returned error status");
            return Err(GatewayError::HttpStatus { status, body });
        }

        let bytes = resp.bytes().await?;
        match serde_json::from_slice(&bytes) {
            Ok(result) => Ok(result),
            Err(e) => {
                let body_str = String::from_utf8_lossy(&bytes);
                tracing::error!("Failed to parse scoring response JSON: {}. Body: {}", e, body_str);
                Err(GatewayError::Decode(e))
            }
        }
    }
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
