//! Retrieval: chunk → embed → store → query.
//!
//! ```text
//! resume / job text -> chunk_words -> Embedder -> DocumentStore
//!                                                     |
//! grounding query  -> Embedder -> cosine top-k <------+
//! ```

pub mod chunker;
pub mod embedder;
pub mod retriever;
pub mod store;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding contains a non-finite component")]
    NonFiniteEmbedding,

    #[error("embedder returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
}
