use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::feedback::FeedbackRecordRow;
use crate::models::user::UserRow;
use crate::records::feedback::{flatten_feedback, load_recent, save_feedback, NewFeedbackRecord};
use crate::records::users::{create_user, get_user};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// POST /api/v1/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if [&req.uid, &req.email, &req.name]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(AppError::Validation("Missing required user data".to_string()));
    }

    let outcome = create_user(&state.db, req.uid.trim(), req.email.trim(), req.name.trim()).await?;
    Ok(Json(MessageResponse {
        message: outcome.message(),
    }))
}

/// GET /api/v1/users/:uid
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<UserRow>, AppError> {
    let user = get_user(&state.db, &uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFeedbackRequest {
    pub user_id: Option<String>,
    pub domain: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub feedback: Map<String, Value>,
    #[serde(default)]
    pub questions: Vec<Value>,
    #[serde(default)]
    pub answers: Vec<Value>,
}

impl SaveFeedbackRequest {
    /// Splits into the owning user id and the record to store.
    pub fn into_record(self) -> Result<(String, NewFeedbackRecord), AppError> {
        let user_id = self
            .user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("User ID is required".to_string()))?;

        let record = NewFeedbackRecord {
            domain: self.domain,
            role: self.role,
            feedback: flatten_feedback(&self.feedback),
            questions: Value::Array(self.questions),
            answers: Value::Array(self.answers),
        };
        Ok((user_id, record))
    }
}

/// POST /api/v1/feedback
pub async fn handle_save_feedback(
    State(state): State<AppState>,
    Json(req): Json<SaveFeedbackRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (user_id, record) = req.into_record()?;
    save_feedback(
        &state.db,
        &user_id,
        &record,
        state.config.feedback_history_limit,
    )
    .await?;

    Ok(Json(MessageResponse {
        message: "Feedback saved successfully",
    }))
}

/// GET /api/v1/feedback/:user_id
pub async fn handle_feedback_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FeedbackRecordRow>>, AppError> {
    let records = load_recent(&state.db, &user_id, state.config.feedback_history_limit).await?;
    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn save_request(body: Value) -> SaveFeedbackRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_save_request_requires_user_id() {
        let err = save_request(json!({ "domain": "Data Science" }))
            .into_record()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "User ID is required"));

        let blank = save_request(json!({ "userId": "  " })).into_record();
        assert!(blank.is_err());
    }

    #[test]
    fn test_save_request_builds_flat_record() {
        let (user_id, record) = save_request(json!({
            "userId": "uid-42",
            "domain": "Web Development",
            "role": "Backend Developer",
            "feedback": { "strength": "Clear", "overallScore": "81", "extra": true },
            "questions": [{ "question": "What is REST?" }],
            "answers": ["An architectural style"]
        }))
        .into_record()
        .unwrap();

        assert_eq!(user_id, "uid-42");
        assert_eq!(record.role.as_deref(), Some("Backend Developer"));
        assert_eq!(record.feedback["overallScore"], "81");
        assert!(record.feedback.get("extra").is_none());
        assert_eq!(record.questions, json!([{ "question": "What is REST?" }]));
        assert_eq!(record.answers, json!(["An architectural style"]));
    }

    #[test]
    fn test_history_row_serializes_camel_case() {
        let row = FeedbackRecordRow {
            user_id: "uid-42".to_string(),
            domain: None,
            role: None,
            feedback: json!({}),
            questions: json!([]),
            answers: json!([]),
            created_at: chrono::DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["userId"], "uid-42");
        assert_eq!(value["createdAt"], "2026-03-01T10:00:00Z");
        assert!(value.get("id").is_none());
    }
}
