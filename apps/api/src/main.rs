mod config;
mod db;
mod errors;
mod evaluation;
mod interview;
mod llm_client;
mod models;
mod outcome;
mod records;
mod retrieval;
mod routes;
mod state;
mod upload;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, FeedbackStrategy};
use crate::db::create_pool;
use crate::evaluation::feedback::{BandFeedback, FeedbackSynthesizer, GenerativeFeedback};
use crate::evaluation::scoring::HeuristicRubric;
use crate::interview::session::RedisSessionStore;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::retrieval::embedder::{Embedder, HashEmbedder, HttpEmbedder};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis-backed interview sessions
    let redis = redis::Client::open(config.redis_url.clone()).context("Invalid REDIS_URL")?;
    let sessions = Arc::new(RedisSessionStore::new(redis, config.session_ttl_secs));
    info!("Session store initialized (ttl: {}s)", config.session_ttl_secs);

    // Initialize LLM client
    let llm: Arc<dyn TextGenerator> = Arc::new(
        LlmClient::new(
            config.anthropic_api_key.clone(),
            Duration::from_secs(config.llm_timeout_secs),
        )
        .context("Failed to build LLM client")?,
    );
    info!(
        "LLM client initialized (model: {}, timeout: {}s)",
        llm_client::MODEL,
        config.llm_timeout_secs
    );

    let embedder = build_embedder(&config)?;
    info!(
        "Embedder initialized (model: {}, dimension: {})",
        embedder.model_name(),
        embedder.dimension()
    );

    // Initialize answer scorer (HeuristicRubric is the only rubric today)
    let scorer = Arc::new(HeuristicRubric);

    let feedback: Arc<dyn FeedbackSynthesizer> = match config.feedback_strategy {
        FeedbackStrategy::Band => Arc::new(BandFeedback),
        FeedbackStrategy::Generative => Arc::new(GenerativeFeedback::new(llm.clone())),
    };
    info!("Feedback strategy: {}", feedback.name());

    // Build app state
    let state = AppState {
        db,
        sessions,
        llm,
        embedder,
        scorer,
        feedback,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// HTTP embeddings when an endpoint is configured, the local hash embedder otherwise.
fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    match &config.embedding_api_url {
        Some(url) => {
            let embedder = HttpEmbedder::new(
                url,
                config.embedding_api_key.clone(),
                config.embedding_model.clone(),
                config.embedding_dimensions,
            )
            .context("Failed to build embedding client")?;
            Ok(Arc::new(embedder))
        }
        None => {
            warn!("EMBEDDING_API_URL not set; using feature-hash embeddings for resume grounding");
            Ok(Arc::new(HashEmbedder::new(config.embedding_dimensions)))
        }
    }
}

/// Permissive CORS unless a single browser origin is configured.
fn build_cors(config: &Config) -> Result<CorsLayer> {
    let Some(origin) = &config.cors_allowed_origin else {
        warn!("CORS_ALLOWED_ORIGIN not set; allowing any origin");
        return Ok(CorsLayer::permissive());
    };

    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("Invalid CORS_ALLOWED_ORIGIN '{origin}'"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
