use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::catalog;
use crate::interview::questions::{assemble_questions, InterviewRequest};
use crate::interview::session::{InterviewSession, Question};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewResponse {
    pub session_id: Uuid,
    pub questions: Vec<Question>,
    /// Fallbacks taken while generating, empty when every call succeeded.
    pub degraded: Vec<String>,
}

/// POST /api/v1/interviews
pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(req): Json<InterviewRequest>,
) -> Result<Json<InterviewResponse>, AppError> {
    let plan = req.into_plan()?;

    let assembled = assemble_questions(
        state.llm.as_ref(),
        state.embedder.clone(),
        state.generation_settings(),
        &plan,
    )
    .await?;

    let mut session = InterviewSession::new(plan.experience, assembled.questions);
    session.user_id = plan.user_id;
    state.sessions.save(&session).await?;

    info!(
        "Created interview {} with {} questions ({} degraded)",
        session.id,
        session.questions.len(),
        assembled.degraded.len()
    );

    Ok(Json(InterviewResponse {
        session_id: session.id,
        questions: session.questions,
        degraded: assembled.degraded,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub question_index: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub success: bool,
    pub answers_recorded: usize,
}

pub(crate) async fn load_session(
    state: &AppState,
    session_id: Uuid,
) -> Result<InterviewSession, AppError> {
    state
        .sessions
        .load(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {session_id} not found")))
}

/// POST /api/v1/interviews/:session_id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let answer = req
        .answer
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Invalid or missing 'answer'".to_string()))?;
    let question_index = req
        .question_index
        .ok_or_else(|| AppError::Validation("Invalid or missing 'questionIndex'".to_string()))?;

    let answers_recorded = state
        .sessions
        .append_answer(session_id, question_index, &answer)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {session_id} not found")))?;

    Ok(Json(SubmitAnswerResponse {
        success: true,
        answers_recorded,
    }))
}

/// DELETE /api/v1/interviews/:session_id
pub async fn handle_end_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.delete(session_id).await? {
        info!("Ended interview {session_id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Interview {session_id} not found")))
    }
}

/// GET /api/v1/domains
pub async fn handle_list_domains() -> Json<Vec<&'static str>> {
    Json(catalog::domains())
}

/// GET /api/v1/domains/:domain/roles
pub async fn handle_list_roles(Path(domain): Path<String>) -> Json<Vec<&'static str>> {
    Json(catalog::roles_for(&domain))
}
