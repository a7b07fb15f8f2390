use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::evaluation::feedback::FeedbackSynthesizer;
use crate::evaluation::scoring::AnswerScorer;
use crate::interview::questions::GenerationSettings;
use crate::interview::session::SessionStore;
use crate::llm_client::TextGenerator;
use crate::retrieval::embedder::Embedder;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Interview sessions. Default: Redis with a TTL.
    pub sessions: Arc<dyn SessionStore>,
    /// Generative text capability. Default: `LlmClient` (Anthropic).
    pub llm: Arc<dyn TextGenerator>,
    /// Sentence embeddings for resume grounding. Each generation request builds its own
    /// `DocumentStore` on top of this.
    pub embedder: Arc<dyn Embedder>,
    /// Pluggable answer rubric. Default: HeuristicRubric.
    pub scorer: Arc<dyn AnswerScorer>,
    /// Pluggable feedback backend. Swap via FEEDBACK_STRATEGY env.
    pub feedback: Arc<dyn FeedbackSynthesizer>,
    pub config: Config,
}

impl AppState {
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            chunk_size: self.config.chunk_size,
            top_k: self.config.retrieval_top_k,
            concurrency: self.config.generation_concurrency,
        }
    }
}
