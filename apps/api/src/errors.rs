use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::evaluation::scoring::ScoringError;
use crate::interview::questions::QuestionError;
use crate::interview::session::SessionError;
use crate::llm_client::LlmError;
use crate::retrieval::RetrievalError;
use crate::upload::UploadError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("No answers submitted for this interview")]
    NoAnswers,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM call timed out: {0}")]
    LlmTimeout(String),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout(_) => AppError::LlmTimeout(e.to_string()),
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl From<QuestionError> for AppError {
    fn from(e: QuestionError) -> Self {
        match e {
            QuestionError::Llm(e) => e.into(),
            QuestionError::Retrieval(e) => e.into(),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::QuestionNotFound(_) => AppError::Validation(e.to_string()),
            other => AppError::Session(other.to_string()),
        }
    }
}

impl From<ScoringError> for AppError {
    fn from(e: ScoringError) -> Self {
        match e {
            ScoringError::EmptyAnswerSet => AppError::NoAnswers,
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Extraction(_) => AppError::UnprocessableEntity(e.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::NoAnswers => (
                StatusCode::BAD_REQUEST,
                "NO_ANSWERS",
                "No answers found for this interview".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Session(msg) => {
                tracing::error!("Session store error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SESSION_ERROR",
                    "The interview session could not be accessed".to_string(),
                )
            }
            AppError::Retrieval(e) => {
                tracing::error!("Retrieval error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RETRIEVAL_ERROR",
                    "Resume indexing failed".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::LlmTimeout(msg) => {
                tracing::error!("LLM timeout: {msg}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "LLM_TIMEOUT",
                    "The AI service took too long to respond".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn status_of(e: impl Into<AppError>) -> StatusCode {
        e.into().into_response().status()
    }

    #[test]
    fn test_llm_errors_map_to_gateway_statuses() {
        assert_eq!(status_of(LlmError::EmptyContent), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(LlmError::Timeout(Duration::from_secs(30))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(QuestionError::Llm(LlmError::RateLimited { retries: 3 })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_empty_answer_set_is_bad_request() {
        assert_eq!(status_of(ScoringError::EmptyAnswerSet), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_question_is_bad_request() {
        assert_eq!(
            status_of(SessionError::QuestionNotFound(9)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_upload_errors_split_between_400_and_422() {
        assert_eq!(
            status_of(UploadError::UnsupportedFormat("cv.exe".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(UploadError::Extraction("bad pdf".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_retrieval_errors_are_internal() {
        assert_eq!(
            status_of(RetrievalError::DimensionMismatch {
                expected: 384,
                actual: 3
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
