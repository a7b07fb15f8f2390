use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// One saved interview result. `feedback` is the flat feedback map; `questions` and
/// `answers` are stored as the client sent them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecordRow {
    pub user_id: String,
    pub domain: Option<String>,
    pub role: Option<String>,
    pub feedback: Value,
    pub questions: Value,
    pub answers: Value,
    pub created_at: DateTime<Utc>,
}
