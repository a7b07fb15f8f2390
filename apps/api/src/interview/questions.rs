//! Question assembly for a new interview.
//!
//! Every interview opens with two behavioral questions (introduction, motivation) and
//! continues with technical questions from one of three paths:
//! - resume present: retrieval-grounded generation over a request-scoped `DocumentStore`
//!   holding the resume and the job text;
//! - custom job, no resume: one direct prompt per question from the job description;
//! - quick setup, no resume: one direct prompt per question for a domain and role.
//!
//! Behavioral questions degrade to canned text. Technical generation is all-or-nothing:
//! the first failed call fails the whole batch.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::interview::prompts::*;
use crate::interview::session::Question;
use crate::llm_client::prompts::QUESTION_ONLY_INSTRUCTION;
use crate::llm_client::{LlmError, TextGenerator};
use crate::outcome::Outcome;
use crate::retrieval::embedder::Embedder;
use crate::retrieval::retriever::{retrieve_context, GROUNDING_QUERY};
use crate::retrieval::store::DocumentStore;
use crate::retrieval::RetrievalError;

pub const MAX_QUESTIONS: usize = 10;
pub const DEFAULT_QUESTIONS: usize = 5;
pub const BEHAVIORAL_QUESTIONS: usize = 2;

pub const RESUME_DOC_ID: &str = "resume";
pub const JOB_DOC_ID: &str = "job";

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

// ────────────────────────────────────────────────────────────────────────────
// Request validation
// ────────────────────────────────────────────────────────────────────────────

fn default_question_count() -> usize {
    DEFAULT_QUESTIONS
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRequest {
    #[serde(default)]
    pub is_custom_job: bool,
    #[serde(default)]
    pub job_description: String,
    pub domain: Option<String>,
    pub role: Option<String>,
    pub experience: Option<String>,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default)]
    pub resume_text: String,
    pub user_id: Option<String>,
}

/// What the technical questions are about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobTarget {
    CustomJob { description: String },
    Role { domain: String, role: String },
}

impl JobTarget {
    /// The job text indexed next to the resume.
    pub fn job_text(&self) -> String {
        match self {
            JobTarget::CustomJob { description } => description.clone(),
            JobTarget::Role { domain, role } => format!("Role: {role} in {domain}"),
        }
    }
}

/// A validated interview request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewPlan {
    pub target: JobTarget,
    pub experience: String,
    pub question_count: usize,
    pub resume_text: Option<String>,
    pub user_id: Option<String>,
}

impl InterviewPlan {
    pub fn technical_count(&self) -> usize {
        self.question_count.saturating_sub(BEHAVIORAL_QUESTIONS)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl InterviewRequest {
    pub fn into_plan(self) -> Result<InterviewPlan, AppError> {
        let target = if self.is_custom_job {
            let description = non_blank(Some(self.job_description)).ok_or_else(|| {
                AppError::Validation("Job description is required for custom jobs".to_string())
            })?;
            JobTarget::CustomJob { description }
        } else {
            match (non_blank(self.domain), non_blank(self.role)) {
                (Some(domain), Some(role)) => JobTarget::Role { domain, role },
                _ => {
                    return Err(AppError::Validation(
                        "Domain and role are required for quick setup".to_string(),
                    ))
                }
            }
        };

        let experience = non_blank(self.experience)
            .ok_or_else(|| AppError::Validation("Experience level is required".to_string()))?;

        if !(1..=MAX_QUESTIONS).contains(&self.question_count) {
            return Err(AppError::Validation(format!(
                "questionCount must be between 1 and {MAX_QUESTIONS}"
            )));
        }

        Ok(InterviewPlan {
            target,
            experience,
            question_count: self.question_count,
            resume_text: non_blank(Some(self.resume_text)),
            user_id: non_blank(self.user_id),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Behavioral questions
// ────────────────────────────────────────────────────────────────────────────

/// Introduction and motivation questions. If either call fails, both are replaced
/// with canned text.
pub async fn behavioral_questions(llm: &dyn TextGenerator) -> Outcome<Vec<Question>> {
    let generated = async {
        let intro = llm
            .generate(INTRO_SYSTEM, &format!("{INTRO_PROMPT} {QUESTION_ONLY_INSTRUCTION}"))
            .await?;
        let motivation = llm
            .generate(
                MOTIVATION_SYSTEM,
                &format!("{MOTIVATION_PROMPT} {QUESTION_ONLY_INSTRUCTION}"),
            )
            .await?;
        Ok::<_, LlmError>(vec![Question::new(intro.trim()), Question::new(motivation.trim())])
    }
    .await;

    match generated {
        Ok(questions) => Outcome::Ok(questions),
        Err(e) => {
            warn!("Behavioral question generation failed, using canned questions: {e}");
            Outcome::degraded(
                vec![
                    Question::new(FALLBACK_INTRO_QUESTION),
                    Question::new(FALLBACK_MOTIVATION_QUESTION),
                ],
                format!("behavioral questions fell back to defaults: {e}"),
            )
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Technical questions
// ────────────────────────────────────────────────────────────────────────────

/// Knobs for technical generation, taken from `Config`.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub chunk_size: usize,
    pub top_k: usize,
    /// Maximum in-flight LLM calls per batch. 1 means strictly sequential.
    pub concurrency: usize,
}

/// Resume-grounded generation.
///
/// Indexes `resume_text` and `job_text` into `store`, then for each question retrieves
/// grounding context with the fixed grounding query and asks for one question. Results
/// come back in index order regardless of completion order. Both documents are removed
/// from `store` before returning, on success and on failure.
pub async fn generate_grounded_questions(
    store: &mut DocumentStore,
    llm: &dyn TextGenerator,
    settings: GenerationSettings,
    resume_text: &str,
    job_text: &str,
    experience: &str,
    count: usize,
) -> Result<Vec<Question>, QuestionError> {
    let result = index_and_generate(store, llm, settings, resume_text, job_text, experience, count)
        .await;

    let removed = store.reset(RESUME_DOC_ID) + store.reset(JOB_DOC_ID);
    debug!("Cleared {removed} chunks after grounded generation");

    result
}

async fn index_and_generate(
    store: &mut DocumentStore,
    llm: &dyn TextGenerator,
    settings: GenerationSettings,
    resume_text: &str,
    job_text: &str,
    experience: &str,
    count: usize,
) -> Result<Vec<Question>, QuestionError> {
    let resume_chunks = store.add_document(RESUME_DOC_ID, resume_text).await?;
    let job_chunks = store.add_document(JOB_DOC_ID, job_text).await?;
    info!(
        "Indexed resume ({resume_chunks} chunks) and job ({job_chunks} chunks), {} total, for {count} questions",
        store.len()
    );

    let store: &DocumentStore = store;
    stream::iter(0..count)
        .map(|index| async move {
            let context = retrieve_context(store, GROUNDING_QUERY, settings.top_k).await?;
            let prompt = build_grounded_prompt(&context, experience, index, count);
            let text = llm.generate(GROUNDED_SYSTEM, &prompt).await?;
            Ok::<_, QuestionError>(Question::new(text.trim()))
        })
        .buffered(settings.concurrency.max(1))
        .try_collect()
        .await
}

/// Direct generation without a resume: one prompt per question from the job target.
pub async fn generate_direct_questions(
    llm: &dyn TextGenerator,
    target: &JobTarget,
    experience: &str,
    count: usize,
    concurrency: usize,
) -> Result<Vec<Question>, QuestionError> {
    let system = match target {
        JobTarget::CustomJob { .. } => CUSTOM_JOB_SYSTEM.to_string(),
        JobTarget::Role { domain, role } => build_role_system(domain, role, experience),
    };
    let system = system.as_str();

    stream::iter(0..count)
        .map(|index| async move {
            let prompt = match target {
                JobTarget::CustomJob { description } => {
                    build_custom_job_prompt(description, index, count)
                }
                JobTarget::Role { domain, role } => {
                    build_role_prompt(domain, role, experience, index, count)
                }
            };
            let text = llm.generate(system, &prompt).await?;
            Ok::<_, QuestionError>(Question::new(text.trim()))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

// ────────────────────────────────────────────────────────────────────────────
// Assembly
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AssembledQuestions {
    pub questions: Vec<Question>,
    /// Reasons for every fallback taken while assembling.
    pub degraded: Vec<String>,
}

/// Behavioral questions followed by the technical questions for `plan`.
pub async fn assemble_questions(
    llm: &dyn TextGenerator,
    embedder: Arc<dyn Embedder>,
    settings: GenerationSettings,
    plan: &InterviewPlan,
) -> Result<AssembledQuestions, QuestionError> {
    let behavioral = behavioral_questions(llm).await;
    debug!(
        "{} behavioral questions ready (degraded: {})",
        behavioral.value().len(),
        behavioral.is_degraded()
    );
    let (mut questions, behavioral_reason) = behavioral.into_parts();
    let technical_count = plan.technical_count();

    let technical = match &plan.resume_text {
        Some(resume_text) => {
            // Fresh per request so concurrent interviews never see each other's chunks.
            let mut store = DocumentStore::new(embedder, settings.chunk_size);
            generate_grounded_questions(
                &mut store,
                llm,
                settings,
                resume_text,
                &plan.target.job_text(),
                &plan.experience,
                technical_count,
            )
            .await?
        }
        None => {
            generate_direct_questions(
                llm,
                &plan.target,
                &plan.experience,
                technical_count,
                settings.concurrency,
            )
            .await?
        }
    };

    questions.extend(technical);
    Ok(AssembledQuestions {
        questions,
        degraded: behavioral_reason.into_iter().collect(),
    })
}
