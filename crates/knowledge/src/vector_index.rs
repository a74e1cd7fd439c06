//! Vector index abstraction for catalog documents.
//!
//! Defines a trait for backend-agnostic vector storage and retrieval.

use crate::types::{Document, ScoredDocument};
use catalog_qa_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Adding documents with their embeddings
/// - Searching for similar vectors (top-k)
/// - Reporting size and dimension
/// - Clearing the index
pub trait VectorIndex: Send + Sync {
    /// Add documents with one embedding each.
    ///
    /// Either every pair is added or none is.
    fn add(&mut self, documents: Vec<Document>, embeddings: Vec<Vec<f32>>) -> AppResult<()>;

    /// Search for the top-k most similar documents to the query embedding.
    ///
    /// Returns documents ordered by descending score; ties keep insertion order.
    fn search(&self, query_embedding: &[f32], k: usize) -> AppResult<Vec<ScoredDocument>>;

    /// Number of indexed documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector length fixed by the first insert.
    fn dimensions(&self) -> Option<usize>;

    /// Remove every document.
    fn clear(&mut self);
}
