//! Grounding-context retrieval for question generation.

use crate::retrieval::store::DocumentStore;
use crate::retrieval::RetrievalError;

/// The fixed query used to pull grounding context for technical questions.
pub const GROUNDING_QUERY: &str =
    "technical skills and experience from resume and job requirements";

/// Returns the `top_k` stored chunk texts most relevant to `query`.
/// An empty store is not an error: callers get no context and proceed without it.
pub async fn retrieve_context(
    store: &DocumentStore,
    query: &str,
    top_k: usize,
) -> Result<Vec<String>, RetrievalError> {
    store.query(query, top_k).await
}
