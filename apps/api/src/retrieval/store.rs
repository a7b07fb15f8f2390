//! Request-scoped document store.
//!
//! Holds the chunked, embedded text of the documents indexed for one question-generation
//! request (in practice `resume` and `job`). A store is created per request and never
//! shared, so one request's cleanup cannot delete another's chunks.
//!
//! Chunks are tagged with their source document id and kept in insertion order;
//! `reset` deletes by that tag, so no chunk of a document survives it regardless of
//! how many chunks the document produced.

use std::sync::Arc;

use tracing::debug;

use crate::retrieval::chunker::chunk_words;
use crate::retrieval::embedder::{Embedder, Embedding};
use crate::retrieval::RetrievalError;

/// One embedded word window of a source document. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// `{source_doc_id}_chunk{sequence_index}`
    pub id: String,
    pub source_doc_id: String,
    /// Position within the source document; contiguous `0..n` per document.
    pub sequence_index: usize,
    pub text: String,
    pub embedding: Embedding,
}

impl Chunk {
    pub fn make_id(doc_id: &str, sequence_index: usize) -> String {
        format!("{doc_id}_chunk{sequence_index}")
    }
}

/// A stored chunk paired with its similarity to a query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub text: String,
    pub score: f32,
}

pub struct DocumentStore {
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
    /// Insertion order doubles as the similarity tie-break.
    chunks: Vec<Chunk>,
    dimension: Option<usize>,
}

impl DocumentStore {
    pub fn new(embedder: Arc<dyn Embedder>, chunk_size: usize) -> Self {
        Self {
            embedder,
            chunk_size,
            chunks: Vec::new(),
            dimension: None,
        }
    }

    /// Chunks and embeds `text`, storing every chunk under `doc_id`. Returns the chunk count.
    ///
    /// Re-adding an existing `doc_id` replaces its previous chunks.
    pub async fn add_document(&mut self, doc_id: &str, text: &str) -> Result<usize, RetrievalError> {
        let texts = chunk_words(text, self.chunk_size);
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != texts.len() {
            return Err(RetrievalError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        let expected = self.dimension.or_else(|| embeddings.first().map(Vec::len));
        if let Some(expected) = expected {
            if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
                return Err(RetrievalError::DimensionMismatch {
                    expected,
                    actual: bad.len(),
                });
            }
        }

        if !embeddings.iter().all(|e| is_finite(e)) {
            return Err(RetrievalError::NonFiniteEmbedding);
        }

        self.reset(doc_id);

        let count = texts.len();
        for (sequence_index, (text, embedding)) in texts.into_iter().zip(embeddings).enumerate() {
            self.chunks.push(Chunk {
                id: Chunk::make_id(doc_id, sequence_index),
                source_doc_id: doc_id.to_string(),
                sequence_index,
                text,
                embedding,
            });
        }
        if count > 0 && self.dimension.is_none() {
            self.dimension = self.chunks.last().map(|c| c.embedding.len());
        }

        debug!("Indexed document '{doc_id}' as {count} chunks");
        Ok(count)
    }

    /// Returns the texts of the `top_k` chunks most similar to `query_text`, best first.
    /// An empty store yields an empty result.
    pub async fn query(&self, query_text: &str, top_k: usize) -> Result<Vec<String>, RetrievalError> {
        Ok(self
            .search(query_text, top_k)
            .await?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Like `query`, but keeps chunk ids and cosine scores.
    pub async fn search(
        &self,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        if self.chunks.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(query_text).await?;
        self.check_dimension(query.len())?;
        if !is_finite(&query) {
            return Err(RetrievalError::NonFiniteEmbedding);
        }

        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(position, chunk)| {
                let score = cosine_similarity(&query, &chunk.embedding);
                // `+ 0.0` folds -0.0 into 0.0 so `total_cmp` treats them as a tie.
                (position, if score.is_nan() { f32::NEG_INFINITY } else { score + 0.0 })
            })
            .collect();

        // Stable sort: equal scores keep insertion order. NaN never reaches here.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| {
                let chunk = &self.chunks[position];
                ScoredChunk {
                    chunk_id: chunk.id.clone(),
                    text: chunk.text.clone(),
                    score,
                }
            })
            .collect())
    }

    /// Deletes every chunk whose source document is `doc_id`. Returns how many were removed.
    pub fn reset(&mut self, doc_id: &str) -> usize {
        let before = self.chunks.len();
        self.chunks.retain(|c| c.source_doc_id != doc_id);
        let removed = before - self.chunks.len();
        if self.chunks.is_empty() {
            self.dimension = None;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn check_dimension(&self, actual: usize) -> Result<(), RetrievalError> {
        match self.dimension {
            Some(expected) if expected != actual => {
                Err(RetrievalError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
impl DocumentStore {
    pub fn get(&self, chunk_id: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.id == chunk_id)
    }

    /// Chunks of one document in sequence order.
    pub fn chunks_for(&self, doc_id: &str) -> Vec<&Chunk> {
        self.chunks
            .iter()
            .filter(|c| c.source_doc_id == doc_id)
            .collect()
    }
}

fn is_finite(embedding: &[f32]) -> bool {
    embedding.iter().all(|x| x.is_finite())
}

/// Cosine similarity in [-1, 1]. Zero-magnitude vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
