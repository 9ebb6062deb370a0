use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use super::models::{Completion, LogStatus, NewPracticeLog, PracticeLog, UserState};
use super::{PracticeStore, StoreError};

#[derive(Default)]
struct Tables {
    logs: Vec<PracticeLog>,
    user_state: HashMap<String, Option<String>>,
    last_created_at: Option<DateTime<Utc>>,
}

/// In-process store used when no database is configured, and by tests.
///
/// `created_at` is strictly increasing across inserts so insertion order and
/// chronological order agree.
#[derive(Default)]
pub struct MemoryPracticeStore {
    tables: RwLock<Tables>,
    writes: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryPracticeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail, to exercise error propagation.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Number of inserts, plus updates that changed at least one row.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Stores a fully-formed log as-is, keeping its id and timestamps.
    pub fn seed_log(&self, log: PracticeLog) {
        let mut tables = self.tables.write();
        tables.logs.push(log);
    }

    pub fn snapshot(&self) -> Vec<PracticeLog> {
        self.tables.read().logs.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store disabled".to_string()));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl PracticeStore for MemoryPracticeStore {
    async fn find_user_state(&self, user_id: &str) -> Result<Option<UserState>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();
        Ok(tables.user_state.get(user_id).map(|current| UserState {
            user_id: user_id.to_string(),
            current_log_id: current.clone(),
        }))
    }

    async fn find_log(&self, log_id: &str) -> Result<Option<PracticeLog>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();
        Ok(tables.logs.iter().find(|log| log.id == log_id).cloned())
    }

    async fn insert_log(&self, log: NewPracticeLog) -> Result<PracticeLog, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();

        let mut created_at = Utc::now();
        if let Some(last) = tables.last_created_at {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }
        tables.last_created_at = Some(created_at);

        let status = log.status();
        let completion = log.completion;
        let row = PracticeLog {
            id: Uuid::new_v4().to_string(),
            user_id: log.user_id,
            word: log.word,
            difficulty: log.difficulty,
            status,
            sentence: completion.as_ref().map(|c| c.sentence.clone()),
            score: completion.as_ref().and_then(|c| c.score),
            level: completion.as_ref().and_then(|c| c.level.clone()),
            suggestion: completion.as_ref().and_then(|c| c.suggestion.clone()),
            corrected_sentence: completion.as_ref().and_then(|c| c.corrected_sentence.clone()),
            created_at,
            updated_at: completion.as_ref().map(|c| c.updated_at),
        };
        tables.logs.push(row.clone());
        drop(tables);

        self.record_write();
        Ok(row)
    }

    async fn mark_resigned(&self, log_id: &str) -> Result<u64, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        let mut affected = 0;
        for log in tables
            .logs
            .iter_mut()
            .filter(|log| log.id == log_id && log.status == LogStatus::Active)
        {
            log.status = LogStatus::Resigned;
            affected += 1;
        }
        drop(tables);

        if affected > 0 {
            self.record_write();
        }
        Ok(affected)
    }

    async fn complete_log(&self, log_id: &str, completion: &Completion) -> Result<u64, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        let mut affected = 0;
        for log in tables.logs.iter_mut().filter(|log| log.id == log_id) {
            log.status = LogStatus::Completed;
            log.sentence = Some(completion.sentence.clone());
            log.score = completion.score;
            log.level = completion.level.clone();
            log.suggestion = completion.suggestion.clone();
            log.corrected_sentence = completion.corrected_sentence.clone();
            log.updated_at = Some(completion.updated_at);
            affected += 1;
        }
        drop(tables);

        if affected > 0 {
            self.record_write();
        }
        Ok(affected)
    }

    async fn set_current_log(&self, user_id: &str, log_id: &str) -> Result<u64, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        let affected = match tables.user_state.get_mut(user_id) {
            Some(current) => {
                *current = Some(log_id.to_string());
                1
            }
            None => 0,
        };
        drop(tables);

        if affected > 0 {
            self.record_write();
        }
        Ok(affected)
    }

    async fn insert_user_state(&self, state: UserState) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        tables.user_state.insert(state.user_id, state.current_log_id);
        drop(tables);

        self.record_write();
        Ok(())
    }

    async fn list_logs(&self, user_id: &str) -> Result<Vec<PracticeLog>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();
        let mut logs: Vec<PracticeLog> = tables
            .logs
            .iter()
            .filter(|log| log.user_id == user_id)
            .cloned()
            .collect();
        logs.sort_by_key(|log| log.created_at);
        Ok(logs)
    }

    async fn count_resigned_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();
        let count = tables
            .logs
            .iter()
            .filter(|log| {
                log.user_id == user_id
                    && log.status == LogStatus::Resigned
                    && log.created_at >= since
            })
            .count();
        Ok(count as i64)
    }

    async fn list_completed_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PracticeLog>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();
        let mut logs: Vec<PracticeLog> = tables
            .logs
            .iter()
            .filter(|log| {
                log.user_id == user_id
                    && log.status == LogStatus::Completed
                    && log.created_at >= since
            })
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(logs)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_increasing_created_at() {
        let store = MemoryPracticeStore::new();
        let first = store
            .insert_log(NewPracticeLog::active("u1", "cat", "beginner"))
            .await
            .unwrap();
        let second = store
            .insert_log(NewPracticeLog::active("u1", "dog", "intermediate"))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.created_at > first.created_at);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_mark_resigned_ignores_terminal_logs() {
        let store = MemoryPracticeStore::new();
        let log = store
            .insert_log(NewPracticeLog::active("u1", "cat", "beginner"))
            .await
            .unwrap();

        assert_eq!(store.mark_resigned(&log.id).await.unwrap(), 1);
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.mark_resigned(&log.id).await.unwrap(), 0);
        assert_eq!(store.write_count(), 2);

        let stored = store.find_log(&log.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LogStatus::Resigned);
    }

    #[tokio::test]
    async fn test_update_of_missing_log_is_not_a_write() {
        let store = MemoryPracticeStore::new();
        let completion = Completion {
            sentence: "A cat.".to_string(),
            score: Some(5.0),
            level: None,
            suggestion: None,
            corrected_sentence: None,
            updated_at: Utc::now(),
        };

        assert_eq!(store.complete_log("missing", &completion).await.unwrap(), 0);
        assert_eq!(store.mark_resigned("missing").await.unwrap(), 0);
        assert_eq!(store.set_current_log("u1", "missing").await.unwrap(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_set_current_log_requires_existing_row() {
        let store = MemoryPracticeStore::new();
        assert_eq!(store.set_current_log("u1", "log-1").await.unwrap(), 0);

        store
            .insert_user_state(UserState {
                user_id: "u1".to_string(),
                current_log_id: None,
            })
            .await
            .unwrap();
        assert_eq!(store.set_current_log("u1", "log-1").await.unwrap(), 1);

        let state = store.find_user_state("u1").await.unwrap().unwrap();
        assert_eq!(state.current_log_id.as_deref(), Some("log-1"));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryPracticeStore::new();
        store.set_unavailable(true);

        let err = store.list_logs("u1").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.ping().await.is_err());
    }
}
