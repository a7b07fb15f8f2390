use std::str::FromStr;

use anyhow::{Context, Result};

use crate::retrieval::chunker::DEFAULT_CHUNK_SIZE;

/// Which feedback synthesizer backs `/feedback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStrategy {
    /// Fixed score-band lookup, no LLM call.
    Band,
    /// LLM summary of the transcript, degrading to the band lookup.
    Generative,
}

impl FromStr for FeedbackStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "band" => Ok(FeedbackStrategy::Band),
            "generative" | "llm" => Ok(FeedbackStrategy::Generative),
            other => anyhow::bail!("Unknown FEEDBACK_STRATEGY '{other}' (expected 'band' or 'generative')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Single allowed browser origin. `None` means permissive CORS (local dev).
    pub cors_allowed_origin: Option<String>,
    /// OpenAI-compatible `/v1/embeddings` base URL. `None` selects the local hash embedder.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub chunk_size: usize,
    pub retrieval_top_k: usize,
    pub llm_timeout_secs: u64,
    pub generation_concurrency: usize,
    pub session_ttl_secs: u64,
    pub feedback_strategy: FeedbackStrategy,
    pub feedback_history_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cors_allowed_origin: optional_env("CORS_ALLOWED_ORIGIN"),
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "all-minilm".to_string()),
            embedding_dimensions: parse_env("EMBEDDING_DIMENSIONS", 384)?,
            chunk_size: parse_env("CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            retrieval_top_k: parse_env("RETRIEVAL_TOP_K", 3)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
            generation_concurrency: parse_env("GENERATION_CONCURRENCY", 3)?,
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 7200)?,
            feedback_strategy: parse_env("FEEDBACK_STRATEGY", FeedbackStrategy::Generative)?,
            feedback_history_limit: parse_env("FEEDBACK_HISTORY_LIMIT", 3)?,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults for handler and router tests. Nothing here is dialed.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/interview_test".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            anthropic_api_key: "test-key".to_string(),
            port: 8080,
            rust_log: "debug".to_string(),
            cors_allowed_origin: None,
            embedding_api_url: None,
            embedding_api_key: None,
            embedding_model: "all-minilm".to_string(),
            embedding_dimensions: 64,
            chunk_size: DEFAULT_CHUNK_SIZE,
            retrieval_top_k: 3,
            llm_timeout_secs: 30,
            generation_concurrency: 3,
            session_ttl_secs: 7200,
            feedback_strategy: FeedbackStrategy::Band,
            feedback_history_limit: 3,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
    }
}
