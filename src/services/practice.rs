use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::db::{Completion, LogStatus, NewPracticeLog, PracticeLog, PracticeStore, StoreError, UserState};
use crate::services::scoring::{GatewayError, ScoringGateway};
use crate::services::vocabulary::WordSelector;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordResponse {
    pub word: String,
    pub difficulty: String,
    pub log_id: String,
    /// 1 when the current word has already been answered, else 0.
    pub play: u8,
}

impl WordResponse {
    fn from_log(log: &PracticeLog) -> Self {
        Self {
            word: log.word.clone(),
            difficulty: log.difficulty.clone(),
            log_id: log.id.clone(),
            play: u8::from(log.status == LogStatus::Completed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub score: f64,
    pub suggestion: Option<String>,
    pub corrected_sentence: Option<String>,
}

#[derive(Debug, Error)]
pub enum PracticeError {
    #[error("no active word found for this user, fetch a word first")]
    NoActiveSession,
    #[error("input word '{submitted}' does not match active word '{expected}'")]
    WordMismatch { submitted: String, expected: String },
    #[error("scoring service failed: {0}")]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives a user's current practice attempt through
/// `active -> completed` and `active -> resigned`.
#[derive(Clone)]
pub struct PracticeService {
    store: Arc<dyn PracticeStore>,
    selector: WordSelector,
    gateway: Arc<dyn ScoringGateway>,
}

impl PracticeService {
    pub fn new(
        store: Arc<dyn PracticeStore>,
        selector: WordSelector,
        gateway: Arc<dyn ScoringGateway>,
    ) -> Self {
        Self {
            store,
            selector,
            gateway,
        }
    }

    pub fn store(&self) -> Arc<dyn PracticeStore> {
        Arc::clone(&self.store)
    }

    /// The log `user_state` points at, in whatever status it is in.
    /// A pointer to a log that no longer exists reads as `None`.
    pub async fn fetch_current(&self, user_id: &str) -> Result<Option<PracticeLog>, PracticeError> {
        let Some(state) = self.store.find_user_state(user_id).await? else {
            return Ok(None);
        };
        let Some(log_id) = state.current_log_id else {
            return Ok(None);
        };

        let log = self.store.find_log(&log_id).await?;
        if log.is_none() {
            tracing::debug!(user_id, log_id = %log_id, "current log pointer is dangling");
        }
        Ok(log)
    }

    /// Resigns any still-active attempt and starts a new one on a random word.
    pub async fn generate_new<R>(&self, user_id: &str, rng: &mut R) -> Result<WordResponse, PracticeError>
    where
        R: Rng + Send + ?Sized,
    {
        if let Some(current) = self.fetch_current(user_id).await? {
            if current.is_active() {
                self.store.mark_resigned(&current.id).await?;
                tracing::info!(user_id, log_id = %current.id, word = %current.word, "practice log resigned");
            }
        }

        let selected = self.selector.select_word(rng, None);
        let log = self
            .store
            .insert_log(NewPracticeLog::active(user_id, &selected.word, &selected.difficulty))
            .await?;

        if self.store.set_current_log(user_id, &log.id).await? == 0 {
            self.store
                .insert_user_state(UserState {
                    user_id: user_id.to_string(),
                    current_log_id: Some(log.id.clone()),
                })
                .await?;
        }

        tracing::info!(
            user_id,
            log_id = %log.id,
            word = %log.word,
            difficulty = %log.difficulty,
            "practice log started"
        );

        Ok(WordResponse::from_log(&log))
    }

    /// Returns the current word, starting a new attempt only when there is none.
    pub async fn fetch_or_generate<R>(&self, user_id: &str, rng: &mut R) -> Result<WordResponse, PracticeError>
    where
        R: Rng + Send + ?Sized,
    {
        match self.fetch_current(user_id).await? {
            Some(log) => Ok(WordResponse::from_log(&log)),
            None => self.generate_new(user_id, rng).await,
        }
    }

    /// Scores `sentence` for the current word and records the outcome.
    ///
    /// An active log is completed in place. A log that is already finished is
    /// left untouched and the new attempt is stored as a sibling log that
    /// becomes the current one.
    pub async fn complete_current(
        &self,
        user_id: &str,
        word: &str,
        sentence: &str,
    ) -> Result<ValidationResult, PracticeError> {
        let current = self
            .fetch_current(user_id)
            .await?
            .ok_or(PracticeError::NoActiveSession)?;

        if current.word.to_lowercase() != word.to_lowercase() {
            return Err(PracticeError::WordMismatch {
                submitted: word.to_string(),
                expected: current.word,
            });
        }

        let verdict = self.gateway.score(word, sentence).await.map_err(|err| {
            tracing::warn!(user_id, log_id = %current.id, error = %err, "sentence scoring failed");
            PracticeError::Gateway(err)
        })?;

        let completion = Completion {
            sentence: sentence.to_string(),
            score: verdict.score,
            level: verdict.level.clone(),
            suggestion: verdict.suggestion.clone(),
            corrected_sentence: verdict.corrected_sentence.clone(),
            updated_at: Utc::now(),
        };

        if current.is_active() {
            self.store.complete_log(&current.id, &completion).await?;
            tracing::info!(user_id, log_id = %current.id, score = ?verdict.score, "practice log completed");
        } else {
            let retry = self
                .store
                .insert_log(NewPracticeLog::completed(
                    user_id,
                    &current.word,
                    &current.difficulty,
                    completion,
                ))
                .await?;
            self.store.set_current_log(user_id, &retry.id).await?;
            tracing::info!(
                user_id,
                previous_log_id = %current.id,
                log_id = %retry.id,
                score = ?verdict.score,
                "practice retry recorded"
            );
        }

        Ok(ValidationResult {
            score: verdict.score.unwrap_or(0.0),
            suggestion: verdict.suggestion,
            corrected_sentence: verdict.corrected_sentence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryPracticeStore;
    use crate::services::scoring::ScoringResult;
    use crate::services::vocabulary::Vocabulary;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct FixedGateway;

    #[async_trait]
    impl ScoringGateway for FixedGateway {
        async fn score(&self, _word: &str, sentence: &str) -> Result<ScoringResult, GatewayError> {
            Ok(ScoringResult {
                score: None,
                level: None,
                suggestion: Some("fine".to_string()),
                corrected_sentence: Some(sentence.to_string()),
            })
        }
    }

    fn service(store: Arc<MemoryPracticeStore>) -> PracticeService {
        let vocabulary = Vocabulary::from_json(
            r#"{"beginner": ["cat"], "intermediate": ["dog"], "advanced": ["fox"]}"#,
        )
        .unwrap();
        PracticeService::new(
            store,
            WordSelector::new(Arc::new(vocabulary)),
            Arc::new(FixedGateway),
        )
    }

    #[tokio::test]
    async fn test_play_flag_tracks_completion() {
        let store = Arc::new(MemoryPracticeStore::new());
        let service = service(Arc::clone(&store));
        let mut rng = StdRng::seed_from_u64(3);

        let first = service.fetch_or_generate("u1", &mut rng).await.unwrap();
        assert_eq!(first.play, 0);

        service
            .complete_current("u1", &first.word.to_uppercase(), "A sentence.")
            .await
            .unwrap();

        let again = service.fetch_or_generate("u1", &mut rng).await.unwrap();
        assert_eq!(again.log_id, first.log_id);
        assert_eq!(again.play, 1);
    }

    #[tokio::test]
    async fn test_missing_gateway_score_defaults_to_zero() {
        let store = Arc::new(MemoryPracticeStore::new());
        let service = service(Arc::clone(&store));
        let mut rng = StdRng::seed_from_u64(3);

        let word = service.generate_new("u1", &mut rng).await.unwrap();
        let result = service
            .complete_current("u1", &word.word, "A sentence.")
            .await
            .unwrap();

        assert_eq!(result.score, 0.0);
        let stored = store.find_log(&word.log_id).await.unwrap().unwrap();
        assert_eq!(stored.score, None);
        assert_eq!(stored.status, LogStatus::Completed);
    }

    #[tokio::test]
    async fn test_dangling_pointer_reads_as_no_session() {
        let store = Arc::new(MemoryPracticeStore::new());
        store
            .insert_user_state(UserState {
                user_id: "u1".to_string(),
                current_log_id: Some("gone".to_string()),
            })
            .await
            .unwrap();
        let service = service(Arc::clone(&store));

        assert!(service.fetch_current("u1").await.unwrap().is_none());
        let err = service
            .complete_current("u1", "cat", "A cat.")
            .await
            .unwrap_err();
        assert!(matches!(err, PracticeError::NoActiveSession));
    }
}
