use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A signed-in user. `uid` is the identity provider's id, not ours.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
