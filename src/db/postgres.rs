use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::migrate::run_migrations;
use super::models::{Completion, LogStatus, NewPracticeLog, PracticeLog, UserState};
use super::{PracticeStore, StoreError};

const LOG_COLUMNS: &str = r#""id", "user_id", "word", "difficulty", "status", "sentence", "score", "level", "suggestion", "corrected_sentence", "created_at", "updated_at""#;

#[derive(Clone)]
pub struct PgPracticeStore {
    pool: PgPool,
}

impl PgPracticeStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        run_migrations(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl PracticeStore for PgPracticeStore {
    async fn find_user_state(&self, user_id: &str) -> Result<Option<UserState>, StoreError> {
        let row = sqlx::query(
            r#"SELECT "user_id", "current_log_id" FROM "user_state" WHERE "user_id" = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(UserState {
                user_id: r.try_get("user_id").map_err(decode_error)?,
                current_log_id: r.try_get("current_log_id").map_err(decode_error)?,
            })
        })
        .transpose()
    }

    async fn find_log(&self, log_id: &str) -> Result<Option<PracticeLog>, StoreError> {
        let sql = format!(r#"SELECT {LOG_COLUMNS} FROM "practice_logs" WHERE "id" = $1"#);
        let row = sqlx::query(&sql)
            .bind(log_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_log).transpose()
    }

    async fn insert_log(&self, log: NewPracticeLog) -> Result<PracticeLog, StoreError> {
        let id = Uuid::new_v4().to_string();
        let status = log.status();
        let completion = log.completion.as_ref();

        let sql = format!(
            r#"
            INSERT INTO "practice_logs"
                ("id", "user_id", "word", "difficulty", "status", "sentence", "score",
                 "level", "suggestion", "corrected_sentence", "updated_at")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {LOG_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&id)
            .bind(&log.user_id)
            .bind(&log.word)
            .bind(&log.difficulty)
            .bind(status.as_str())
            .bind(completion.map(|c| c.sentence.clone()))
            .bind(completion.and_then(|c| c.score))
            .bind(completion.and_then(|c| c.level.clone()))
            .bind(completion.and_then(|c| c.suggestion.clone()))
            .bind(completion.and_then(|c| c.corrected_sentence.clone()))
            .bind(completion.map(|c| c.updated_at))
            .fetch_one(&self.pool)
            .await?;

        map_log(&row)
    }

    async fn mark_resigned(&self, log_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"UPDATE "practice_logs" SET "status" = $1 WHERE "id" = $2 AND "status" = $3"#,
        )
        .bind(LogStatus::Resigned.as_str())
        .bind(log_id)
        .bind(LogStatus::Active.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn complete_log(&self, log_id: &str, completion: &Completion) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE "practice_logs"
            SET "status" = $1, "sentence" = $2, "score" = $3, "level" = $4,
                "suggestion" = $5, "corrected_sentence" = $6, "updated_at" = $7
            WHERE "id" = $8
            "#,
        )
        .bind(LogStatus::Completed.as_str())
        .bind(&completion.sentence)
        .bind(completion.score)
        .bind(&completion.level)
        .bind(&completion.suggestion)
        .bind(&completion.corrected_sentence)
        .bind(completion.updated_at)
        .bind(log_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn set_current_log(&self, user_id: &str, log_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"UPDATE "user_state" SET "current_log_id" = $1, "updated_at" = NOW() WHERE "user_id" = $2"#,
        )
        .bind(log_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_user_state(&self, state: UserState) -> Result<(), StoreError> {
        sqlx::query(r#"INSERT INTO "user_state" ("user_id", "current_log_id") VALUES ($1, $2)"#)
            .bind(&state.user_id)
            .bind(&state.current_log_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_logs(&self, user_id: &str) -> Result<Vec<PracticeLog>, StoreError> {
        let sql = format!(
            r#"SELECT {LOG_COLUMNS} FROM "practice_logs" WHERE "user_id" = $1 ORDER BY "created_at" ASC"#
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(map_logs_lenient(&rows))
    }

    async fn count_resigned_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM "practice_logs"
            WHERE "user_id" = $1 AND "status" = $2 AND "created_at" >= $3
            "#,
        )
        .bind(user_id)
        .bind(LogStatus::Resigned.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_completed_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PracticeLog>, StoreError> {
        let sql = format!(
            r#"
            SELECT {LOG_COLUMNS} FROM "practice_logs"
            WHERE "user_id" = $1 AND "status" = $2 AND "created_at" >= $3
            ORDER BY "created_at" DESC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(LogStatus::Completed.as_str())
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        Ok(map_logs_lenient(&rows))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn map_logs_lenient(rows: &[PgRow]) -> Vec<PracticeLog> {
    rows.iter()
        .filter_map(|row| match map_log(row) {
            Ok(log) => Some(log),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed practice log");
                None
            }
        })
        .collect()
}

fn map_log(row: &PgRow) -> Result<PracticeLog, StoreError> {
    let raw_status: String = row.try_get("status").map_err(decode_error)?;
    let status = LogStatus::parse(&raw_status)
        .ok_or_else(|| StoreError::Decode(format!("unknown status '{raw_status}'")))?;

    Ok(PracticeLog {
        id: row.try_get("id").map_err(decode_error)?,
        user_id: row.try_get("user_id").map_err(decode_error)?,
        word: row.try_get("word").map_err(decode_error)?,
        difficulty: row.try_get("difficulty").map_err(decode_error)?,
        status,
        sentence: row.try_get("sentence").map_err(decode_error)?,
        score: row.try_get("score").map_err(decode_error)?,
        level: row.try_get("level").map_err(decode_error)?,
        suggestion: row.try_get("suggestion").map_err(decode_error)?,
        corrected_sentence: row.try_get("corrected_sentence").map_err(decode_error)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
    })
}

fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::Decode(err.to_string())
}
