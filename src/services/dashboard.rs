use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::db::{LogStatus, PracticeLog, PracticeStore, StoreError};
use crate::services::vocabulary::Difficulty;

/// Length of the trailing per-day window, today included.
pub const WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyWords {
    pub date: NaiveDate,
    pub words: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyScore {
    pub date: NaiveDate,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelScore {
    pub level: String,
    pub score: f64,
}

/// One completed attempt: `count` is the 1-based ordinal of completions of that word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCountPoint {
    pub count: u32,
    pub score: f64,
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub avg_score_today: f64,
    pub avg_score_all: f64,
    pub today_skip: i64,
    pub word_per_day: Vec<DailyWords>,
    pub score_per_day: Vec<DailyScore>,
    pub avg_score_level: Vec<LevelScore>,
    pub score_count_data: Vec<ScoreCountPoint>,
}

pub async fn compute_summary(
    store: &dyn PracticeStore,
    user_id: &str,
) -> Result<SummaryReport, StoreError> {
    let now = Utc::now();
    let logs = store.list_logs(user_id).await?;
    let today_skip = store.count_resigned_since(user_id, start_of_day(now)).await?;

    tracing::debug!(user_id, logs = logs.len(), today_skip, "computing dashboard summary");

    Ok(summarize(&logs, today_skip, now))
}

pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(now.date_naive().and_time(NaiveTime::MIN), Utc)
}

/// Folds a user's chronologically ordered history into the dashboard summary.
pub fn summarize(logs: &[PracticeLog], today_skip: i64, now: DateTime<Utc>) -> SummaryReport {
    let today = now.date_naive();
    let window_start = today - Duration::days(WINDOW_DAYS - 1);

    let mut attempts: HashMap<&str, u32> = HashMap::new();
    let mut all_scores = Vec::new();
    let mut today_scores = Vec::new();
    // First-seen order, so unknown tiers keep their order after the stable sort.
    let mut level_scores: Vec<(&str, Vec<f64>)> = Vec::new();
    let mut words_by_day: HashMap<NaiveDate, BTreeMap<String, u32>> = HashMap::new();
    let mut scores_by_day: HashMap<NaiveDate, Vec<f64>> = HashMap::new();
    let mut score_count_data = Vec::new();

    for log in logs {
        if log.status != LogStatus::Completed {
            continue;
        }
        let Some(score) = log.score.filter(|s| s.is_finite()) else {
            tracing::warn!(log_id = %log.id, "completed log has no usable score, skipping");
            continue;
        };

        let attempt = attempts.entry(log.word.as_str()).or_insert(0);
        *attempt += 1;

        all_scores.push(score);
        match level_scores
            .iter_mut()
            .find(|(level, _)| *level == log.difficulty.as_str())
        {
            Some((_, scores)) => scores.push(score),
            None => level_scores.push((log.difficulty.as_str(), vec![score])),
        }
        score_count_data.push(ScoreCountPoint {
            count: *attempt,
            score,
            difficulty: log.difficulty.clone(),
        });

        let date = log.created_at.date_naive();
        if date == today {
            today_scores.push(score);
        }
        if date >= window_start && date <= today {
            *words_by_day
                .entry(date)
                .or_default()
                .entry(log.word.clone())
                .or_insert(0) += 1;
            scores_by_day.entry(date).or_default().push(score);
        }
    }

    let mut word_per_day = Vec::with_capacity(WINDOW_DAYS as usize);
    let mut score_per_day = Vec::with_capacity(WINDOW_DAYS as usize);
    for offset in 0..WINDOW_DAYS {
        let date = window_start + Duration::days(offset);
        word_per_day.push(DailyWords {
            date,
            words: words_by_day.remove(&date).unwrap_or_default(),
        });
        let day_scores = scores_by_day.get(&date).map(Vec::as_slice).unwrap_or_default();
        score_per_day.push(DailyScore {
            date,
            score: round_two(mean(day_scores)),
        });
    }

    let mut avg_score_level: Vec<LevelScore> = level_scores
        .into_iter()
        .map(|(level, scores)| LevelScore {
            level: level.to_string(),
            score: round_two(mean(&scores)),
        })
        .collect();
    avg_score_level.sort_by_key(|level| Difficulty::rank(&level.level));

    SummaryReport {
        avg_score_today: round_two(mean(&today_scores)),
        avg_score_all: round_two(mean(&all_scores)),
        today_skip,
        word_per_day,
        score_per_day,
        avg_score_level,
        score_count_data,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
