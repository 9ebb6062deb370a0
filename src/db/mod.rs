pub mod memory;
pub mod migrate;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::MemoryPracticeStore;
pub use models::{Completion, LogStatus, NewPracticeLog, PracticeLog, UserState};
pub use postgres::PgPracticeStore;

/// Persistence for `practice_logs` and `user_state`.
///
/// Every method is an independent round-trip. Multi-step sequences built on
/// top of this trait (resign, insert, repoint) are not atomic: a failure
/// between steps can leave `user_state` pointing at a log other than the
/// newest one, and readers must treat a dangling `current_log_id` as "no
/// current log".
#[async_trait]
pub trait PracticeStore: Send + Sync {
    async fn find_user_state(&self, user_id: &str) -> Result<Option<UserState>, StoreError>;

    async fn find_log(&self, log_id: &str) -> Result<Option<PracticeLog>, StoreError>;

    async fn insert_log(&self, log: NewPracticeLog) -> Result<PracticeLog, StoreError>;

    /// Moves an `active` log to `resigned`. Logs in any other state are left untouched.
    async fn mark_resigned(&self, log_id: &str) -> Result<u64, StoreError>;

    async fn complete_log(&self, log_id: &str, completion: &Completion) -> Result<u64, StoreError>;

    /// Repoints an existing `user_state` row. Returns 0 when the user has none.
    async fn set_current_log(&self, user_id: &str, log_id: &str) -> Result<u64, StoreError>;

    async fn insert_user_state(&self, state: UserState) -> Result<(), StoreError>;

    /// All logs of a user, oldest first.
    async fn list_logs(&self, user_id: &str) -> Result<Vec<PracticeLog>, StoreError>;

    async fn count_resigned_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Completed logs created at or after `since`, newest first.
    async fn list_completed_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PracticeLog>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] migrate::MigrationError),
    #[error("malformed row: {0}")]
    Decode(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
