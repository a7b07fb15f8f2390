use sqlx::PgPool;
use tracing::info;

use crate::models::user::UserRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateUserOutcome {
    Created,
    AlreadyExists,
}

impl CreateUserOutcome {
    pub fn message(self) -> &'static str {
        match self {
            CreateUserOutcome::Created => "User created successfully",
            CreateUserOutcome::AlreadyExists => "User already exists",
        }
    }
}

/// Inserts the user unless one with the same `uid` exists. Existing rows are left as-is.
pub async fn create_user(
    pool: &PgPool,
    uid: &str,
    email: &str,
    name: &str,
) -> Result<CreateUserOutcome, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (uid, email, name)
        VALUES ($1, $2, $3)
        ON CONFLICT (uid) DO NOTHING
        "#,
    )
    .bind(uid)
    .bind(email)
    .bind(name)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        info!("Created user {uid}");
        Ok(CreateUserOutcome::Created)
    } else {
        Ok(CreateUserOutcome::AlreadyExists)
    }
}

pub async fn get_user(pool: &PgPool, uid: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as("SELECT uid, email, name, created_at FROM users WHERE uid = $1")
        .bind(uid)
        .fetch_optional(pool)
        .await
}
