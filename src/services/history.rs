use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{PracticeLog, PracticeStore, StoreError};
use crate::services::dashboard::start_of_day;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayLogItem {
    pub datetime: DateTime<Utc>,
    pub word: String,
    pub user_sentence: String,
    pub score: f64,
    pub suggestion: Option<String>,
}

impl From<PracticeLog> for TodayLogItem {
    fn from(log: PracticeLog) -> Self {
        Self {
            datetime: log.created_at,
            word: log.word,
            user_sentence: log.sentence.unwrap_or_default(),
            score: log.score.unwrap_or(0.0),
            suggestion: log.suggestion,
        }
    }
}

/// Completed attempts since the start of the current UTC day, newest first.
pub async fn today_logs(
    store: &dyn PracticeStore,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<TodayLogItem>, StoreError> {
    let logs = store.list_completed_since(user_id, start_of_day(now)).await?;
    Ok(logs.into_iter().map(TodayLogItem::from).collect())
}
