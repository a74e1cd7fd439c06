//! Catalog document types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One catalog row, ready to embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Random identifier assigned at load time
    pub id: String,

    /// `"column: value"` lines, one per content column
    pub page_content: String,

    /// Where the row came from
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document with a fresh UUID.
    pub fn new(page_content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            page_content: page_content.into(),
            metadata,
        }
    }
}

/// Provenance of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// File path, or the value of the configured source column
    pub source: String,

    /// Zero-based data row index within its file
    pub row: usize,

    /// Values of the configured metadata columns
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl DocumentMetadata {
    pub fn new(source: impl Into<String>, row: usize) -> Self {
        Self {
            source: source.into(),
            row,
            extra: BTreeMap::new(),
        }
    }
}

/// A retrieval hit. Higher scores are more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Summary of a built vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of indexed documents
    pub documents: usize,

    /// Embedding dimension (unset while the store is empty)
    pub dimensions: Option<usize>,

    /// Embedding provider name
    pub embedding_provider: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Similarity metric
    pub metric: String,

    /// When the store was created
    pub built_at: DateTime<Utc>,
}
