use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::debug;

use crate::models::feedback::FeedbackRecordRow;

/// Keys kept from a submitted feedback object.
pub const FEEDBACK_KEYS: &[&str] = &["strength", "areasOfImprovement", "weakness", "overallScore"];

/// A feedback record as submitted, before it gets an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedbackRecord {
    pub domain: Option<String>,
    pub role: Option<String>,
    pub feedback: Value,
    pub questions: Value,
    pub answers: Value,
}

/// Projects `feedback` onto `FEEDBACK_KEYS`. Missing keys become `null`; anything else
/// the client sent is dropped.
pub fn flatten_feedback(feedback: &Map<String, Value>) -> Value {
    let flat: Map<String, Value> = FEEDBACK_KEYS
        .iter()
        .map(|key| {
            let value = feedback.get(*key).cloned().unwrap_or(Value::Null);
            (key.to_string(), value)
        })
        .collect();
    Value::Object(flat)
}

/// Stores `record` and prunes the user's history down to the newest `keep` records.
pub async fn save_feedback(
    pool: &PgPool,
    user_id: &str,
    record: &NewFeedbackRecord,
    keep: i64,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO feedback_records (user_id, domain, role, feedback, questions, answers)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(user_id)
    .bind(&record.domain)
    .bind(&record.role)
    .bind(&record.feedback)
    .bind(&record.questions)
    .bind(&record.answers)
    .execute(&mut *tx)
    .await?;

    let pruned = sqlx::query(
        r#"
        DELETE FROM feedback_records
        WHERE user_id = $1
          AND id NOT IN (
              SELECT id FROM feedback_records
              WHERE user_id = $1
              ORDER BY created_at DESC, id DESC
              LIMIT $2
          )
        "#,
    )
    .bind(user_id)
    .bind(keep)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    debug!(
        "Saved feedback for {user_id}, pruned {} old records",
        pruned.rows_affected()
    );
    Ok(())
}

/// The newest `limit` records for the user, newest first.
pub async fn load_recent(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<FeedbackRecordRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT user_id, domain, role, feedback, questions, answers, created_at
        FROM feedback_records
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
