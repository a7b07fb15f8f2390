use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::feedback::Feedback;
use crate::evaluation::ideal_answer::review_answer;
use crate::evaluation::scoring::{score_session, ScoreBreakdown};
use crate::interview::handlers::load_session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    #[serde(flatten)]
    pub feedback: Feedback,
    /// Per-answer rubric results, in submission order.
    pub scores: Vec<ScoreBreakdown>,
    pub scorer: String,
    pub feedback_strategy: &'static str,
    /// Why the feedback fell back to the score band, if it did.
    pub degraded: Option<String>,
}

/// POST /api/v1/interviews/:session_id/feedback
///
/// Scores are recomputed from the stored answers on every call.
pub async fn handle_interview_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let session = load_session(&state, session_id).await?;

    let score = score_session(
        state.scorer.as_ref(),
        &session.answers,
        session.experience_level(),
    )?;

    let outcome = state
        .feedback
        .synthesize(score.overall, &session.answers)
        .await;
    if let Some(reason) = outcome.reason() {
        warn!("Feedback for interview {session_id} degraded: {reason}");
    }
    let (feedback, degraded) = outcome.into_parts();
    info!(
        "Scored interview {session_id}: {} answers, overall {}",
        score.per_answer.len(),
        score.overall
    );

    Ok(Json(FeedbackResponse {
        feedback,
        scores: score.per_answer,
        scorer: score.scorer_backend,
        feedback_strategy: state.feedback.name(),
        degraded,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealAnswerRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub user_answer: String,
}

#[derive(Debug, Serialize)]
pub struct IdealAnswerResponse {
    pub response: String,
}

/// POST /api/v1/ideal-answer
pub async fn handle_ideal_answer(
    State(state): State<AppState>,
    Json(req): Json<IdealAnswerRequest>,
) -> Result<Json<IdealAnswerResponse>, AppError> {
    if req.question.trim().is_empty() || req.user_answer.trim().is_empty() {
        return Err(AppError::Validation(
            "Question and user answer are required".to_string(),
        ));
    }

    let response = review_answer(state.llm.as_ref(), &req.question, &req.user_answer).await?;
    Ok(Json(IdealAnswerResponse { response }))
}
