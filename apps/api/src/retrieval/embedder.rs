//! Sentence embeddings.
//!
//! Two backends sit behind the `Embedder` trait:
//! - `HttpEmbedder`: any OpenAI-compatible `/v1/embeddings` endpoint (Ollama, text-embeddings-inference,
//!   OpenAI). Serves a pretrained sentence-embedding model such as all-MiniLM-L6-v2.
//! - `HashEmbedder`: signed feature hashing over lowercase word tokens. No model, no network;
//!   used when no endpoint is configured and in tests.
//!
//! Both are deterministic for a fixed input and produce vectors of a single dimension.

use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::retrieval::RetrievalError;

/// A dense vector for one piece of text.
pub type Embedding = Vec<f32>;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds each text, preserving order. Returns exactly one vector per input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, RetrievalError>;

    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, RetrievalError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Embedding("embedder returned no vectors".to_string()))
    }

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

// ────────────────────────────────────────────────────────────────────────────
// HttpEmbedder
// ────────────────────────────────────────────────────────────────────────────

pub struct HttpEmbedder {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
}

impl HttpEmbedder {
    /// `base_url` is the server root, e.g. `http://localhost:11434`; `/v1/embeddings` is appended.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: String,
        dimension: usize,
    ) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| RetrievalError::Embedding(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/v1/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model,
            dimension,
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// Orders response items by `index` and checks count and dimension.
///
/// Servers may return items out of order; `index` is authoritative when present.
/// Items without one keep their response position.
fn into_embeddings(
    mut response: EmbeddingResponse,
    expected: usize,
    dimension: usize,
) -> Result<Vec<Embedding>, RetrievalError> {
    if response.data.len() != expected {
        return Err(RetrievalError::CountMismatch {
            expected,
            actual: response.data.len(),
        });
    }

    response.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));

    response
        .data
        .into_iter()
        .map(|d| {
            if d.embedding.len() == dimension {
                Ok(d.embedding)
            } else {
                Err(RetrievalError::DimensionMismatch {
                    expected: dimension,
                    actual: d.embedding.len(),
                })
            }
        })
        .collect()
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.model, batch_size = texts.len(), "embedding batch");

        let mut request = self.client.post(&self.url).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RetrievalError::Embedding(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Embedding(format!(
                "embedding API returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Embedding(format!("invalid response body: {e}")))?;

        into_embeddings(parsed, texts.len(), self.dimension)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HashEmbedder
// ────────────────────────────────────────────────────────────────────────────

/// Feature-hashing embedder: each lowercase alphanumeric token adds ±1 to one bucket,
/// and the result is L2-normalized. Texts sharing vocabulary land close together.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0_f32; self.dimension];

        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        for token in tokens {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let hash = hasher.finish();
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, RetrievalError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "feature-hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::store::cosine_similarity;

    #[tokio::test]
    async fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("Kubernetes and Docker deployments").await.unwrap();
        let b = embedder.embed("Kubernetes and Docker deployments").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_hash_embedder_fixed_dimension_and_unit_norm() {
        let embedder = HashEmbedder::new(384);
        let vectors = embedder
            .embed_batch(&["short".to_string(), "a much longer sentence about rust".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
        for v in &vectors {
            assert_eq!(v.len(), 384);
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
        }
    }

    #[tokio::test]
    async fn test_hash_embedder_is_case_insensitive() {
        let embedder = HashEmbedder::new(128);
        let a = embedder.embed("REST API").await.unwrap();
        let b = embedder.embed("rest api").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_hash_embedder_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(16);
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let embedder = HashEmbedder::new(384);
        let query = embedder.embed("python machine learning").await.unwrap();
        let close = embedder.embed("machine learning pipelines in python").await.unwrap();
        let far = embedder.embed("managed a retail store").await.unwrap();
        assert!(cosine_similarity(&query, &close) > cosine_similarity(&query, &far));
    }

    #[test]
    fn test_http_embedder_builds_endpoint_url() {
        let embedder =
            HttpEmbedder::new("http://localhost:11434/", None, "all-minilm".to_string(), 384)
                .unwrap();
        assert_eq!(embedder.url, "http://localhost:11434/v1/embeddings");
        assert_eq!(embedder.dimension(), 384);
        assert_eq!(embedder.model_name(), "all-minilm");
    }

    fn response(json: &str) -> EmbeddingResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_response_items_are_reordered_by_index() {
        let parsed = response(
            r#"{"data": [
                {"embedding": [0.0, 3.0], "index": 2},
                {"embedding": [1.0, 0.0], "index": 0},
                {"embedding": [0.0, 2.0], "index": 1}
            ]}"#,
        );
        let vectors = into_embeddings(parsed, 3, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 2.0], vec![0.0, 3.0]]);
    }

    #[test]
    fn test_response_without_index_keeps_position() {
        let parsed = response(r#"{"data": [{"embedding": [1.0]}, {"embedding": [2.0]}]}"#);
        assert_eq!(into_embeddings(parsed, 2, 1).unwrap(), vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_response_with_wrong_item_count_is_rejected() {
        let parsed = response(r#"{"data": [{"embedding": [1.0, 0.0], "index": 0}]}"#);
        assert!(matches!(
            into_embeddings(parsed, 2, 2),
            Err(RetrievalError::CountMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_response_with_wrong_vector_length_is_rejected() {
        let parsed = response(
            r#"{"data": [
                {"embedding": [1.0, 0.0], "index": 0},
                {"embedding": [1.0, 0.0, 0.0], "index": 1}
            ]}"#,
        );
        assert!(matches!(
            into_embeddings(parsed, 2, 2),
            Err(RetrievalError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }
}
