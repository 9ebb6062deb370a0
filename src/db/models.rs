use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Active,
    Completed,
    Resigned,
}

impl LogStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogStatus::Active => "active",
            LogStatus::Completed => "completed",
            LogStatus::Resigned => "resigned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(LogStatus::Active),
            "completed" => Some(LogStatus::Completed),
            "resigned" => Some(LogStatus::Resigned),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, LogStatus::Active)
    }
}

/// One attempt at using a word in a sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PracticeLog {
    pub id: String,
    pub user_id: String,
    pub word: String,
    pub difficulty: String,
    pub status: LogStatus,
    pub sentence: Option<String>,
    pub score: Option<f64>,
    pub level: Option<String>,
    pub suggestion: Option<String>,
    pub corrected_sentence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PracticeLog {
    pub fn is_active(&self) -> bool {
        self.status == LogStatus::Active
    }
}

/// Scoring outcome written onto a log when it becomes `completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub sentence: String,
    pub score: Option<f64>,
    pub level: Option<String>,
    pub suggestion: Option<String>,
    pub corrected_sentence: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPracticeLog {
    pub user_id: String,
    pub word: String,
    pub difficulty: String,
    pub completion: Option<Completion>,
}

impl NewPracticeLog {
    pub fn active(user_id: &str, word: &str, difficulty: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            word: word.to_string(),
            difficulty: difficulty.to_string(),
            completion: None,
        }
    }

    pub fn completed(user_id: &str, word: &str, difficulty: &str, completion: Completion) -> Self {
        Self {
            user_id: user_id.to_string(),
            word: word.to_string(),
            difficulty: difficulty.to_string(),
            completion: Some(completion),
        }
    }

    pub fn status(&self) -> LogStatus {
        if self.completion.is_some() {
            LogStatus::Completed
        } else {
            LogStatus::Active
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserState {
    pub user_id: String,
    pub current_log_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [LogStatus::Active, LogStatus::Completed, LogStatus::Resigned] {
            assert_eq!(LogStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LogStatus::parse("skipped"), None);
    }

    #[test]
    fn test_only_active_is_non_terminal() {
        assert!(!LogStatus::Active.is_terminal());
        assert!(LogStatus::Completed.is_terminal());
        assert!(LogStatus::Resigned.is_terminal());
    }

    #[test]
    fn test_new_log_status_follows_completion() {
        let active = NewPracticeLog::active("u1", "cat", "beginner");
        assert_eq!(active.status(), LogStatus::Active);

        let completion = Completion {
            sentence: "I have a cat.".to_string(),
            score: Some(8.0),
            level: None,
            suggestion: None,
            corrected_sentence: None,
            updated_at: Utc::now(),
        };
        let completed = NewPracticeLog::completed("u1", "cat", "beginner", completion);
        assert_eq!(completed.status(), LogStatus::Completed);
    }
}
