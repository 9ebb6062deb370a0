use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use hogword_backend::db::{LogStatus, PracticeLog};
use hogword_backend::services::dashboard::{summarize, WINDOW_DAYS};

const WORDS: [&str; 3] = ["cat", "dog", "fox"];
const TIERS: [&str; 3] = ["beginner", "intermediate", "advanced"];

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
}

fn status_strategy() -> impl Strategy<Value = LogStatus> {
    prop_oneof![
        Just(LogStatus::Active),
        Just(LogStatus::Completed),
        Just(LogStatus::Resigned),
    ]
}

fn history_strategy() -> impl Strategy<Value = Vec<PracticeLog>> {
    prop::collection::vec((0usize..3, status_strategy(), 0u32..=10, 0i64..20 * 24), 0..40).prop_map(
        |entries| {
            let mut logs: Vec<PracticeLog> = entries
                .into_iter()
                .enumerate()
                .map(|(i, (word, status, score, hours_ago))| PracticeLog {
                    id: format!("log-{i}"),
                    user_id: "u1".to_string(),
                    word: WORDS[word].to_string(),
                    difficulty: TIERS[word].to_string(),
                    status,
                    sentence: None,
                    score: Some(f64::from(score)),
                    level: None,
                    suggestion: None,
                    corrected_sentence: None,
                    created_at: now() - Duration::hours(hours_ago) - Duration::seconds(i as i64),
                    updated_at: None,
                })
                .collect();
            logs.sort_by_key(|log| log.created_at);
            logs
        },
    )
}

proptest! {
    #[test]
    fn window_is_seven_consecutive_days_ending_today(logs in history_strategy()) {
        let report = summarize(&logs, 0, now());

        prop_assert_eq!(report.word_per_day.len(), WINDOW_DAYS as usize);
        prop_assert_eq!(report.score_per_day.len(), WINDOW_DAYS as usize);
        prop_assert_eq!(report.word_per_day.last().unwrap().date, now().date_naive());
        for pair in report.word_per_day.windows(2) {
            prop_assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn attempt_numbers_count_up_per_word(logs in history_strategy()) {
        let report = summarize(&logs, 0, now());

        let completed: Vec<&PracticeLog> = logs
            .iter()
            .filter(|log| log.status == LogStatus::Completed)
            .collect();
        prop_assert_eq!(report.score_count_data.len(), completed.len());

        let mut seen: HashMap<&str, u32> = HashMap::new();
        for (point, log) in report.score_count_data.iter().zip(&completed) {
            let expected = seen.entry(log.word.as_str()).or_insert(0);
            *expected += 1;
            prop_assert_eq!(point.count, *expected);
            prop_assert_eq!(&point.difficulty, &log.difficulty);
        }
    }

    #[test]
    fn averages_stay_within_score_range(logs in history_strategy()) {
        let report = summarize(&logs, 3, now());

        prop_assert_eq!(report.today_skip, 3);
        prop_assert!((0.0..=10.0).contains(&report.avg_score_all));
        prop_assert!((0.0..=10.0).contains(&report.avg_score_today));
        for level in &report.avg_score_level {
            prop_assert!((0.0..=10.0).contains(&level.score));
        }
        let window_words: u32 = report
            .word_per_day
            .iter()
            .flat_map(|day| day.words.values())
            .sum();
        let completed_in_window = logs
            .iter()
            .filter(|log| log.status == LogStatus::Completed)
            .filter(|log| log.created_at.date_naive() > now().date_naive() - Duration::days(WINDOW_DAYS))
            .count();
        prop_assert_eq!(window_words as usize, completed_in_window);
    }
}
