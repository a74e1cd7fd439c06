//! Retriever: a vector store plus fixed search settings.

use crate::store::VectorStore;
use crate::types::ScoredDocument;
use catalog_qa_core::{AppError, AppResult, RetrievalConfig};
use serde::Serialize;
use std::sync::Arc;

/// How documents are selected for a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchType {
    /// Plain top-k by score
    Similarity,
    /// Top-k, keeping only hits scoring at least `threshold`
    SimilarityScoreThreshold { threshold: f32 },
    /// Maximal marginal relevance over the `fetch_k` nearest
    Mmr { fetch_k: usize, lambda_mult: f32 },
}

impl SearchType {
    /// Build from the `searchType` name plus its tuning values.
    pub fn from_config(config: &RetrievalConfig) -> AppResult<Self> {
        match config.search_type.as_str() {
            "similarity" => Ok(Self::Similarity),
            "similarity_score_threshold" => Ok(Self::SimilarityScoreThreshold {
                threshold: config.score_threshold,
            }),
            "mmr" => Ok(Self::Mmr {
                fetch_k: config.fetch_k,
                lambda_mult: config.lambda_mult,
            }),
            other => Err(AppError::Config(format!(
                "Unknown search type: {}. Supported: similarity, similarity_score_threshold, mmr",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Similarity => "similarity",
            Self::SimilarityScoreThreshold { .. } => "similarity_score_threshold",
            Self::Mmr { .. } => "mmr",
        }
    }
}

/// Retriever settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchOptions {
    pub k: usize,
    pub search_type: SearchType,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            k: 4,
            search_type: SearchType::Similarity,
        }
    }
}

impl SearchOptions {
    pub fn from_config(config: &RetrievalConfig) -> AppResult<Self> {
        Ok(Self {
            k: config.top_k,
            search_type: SearchType::from_config(config)?,
        })
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

/// Fetches the documents relevant to a question.
#[derive(Debug, Clone)]
pub struct Retriever {
    store: Arc<VectorStore>,
    options: SearchOptions,
}

impl Retriever {
    pub fn new(store: Arc<VectorStore>, options: SearchOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    /// Documents for `query`, best first.
    pub async fn relevant_documents(&self, query: &str) -> AppResult<Vec<ScoredDocument>> {
        let k = self.options.k;

        let hits = match self.options.search_type {
            SearchType::Similarity => self.store.similarity_search_with_score(query, k).await?,
            SearchType::SimilarityScoreThreshold { threshold } => {
                let mut hits = self.store.similarity_search_with_score(query, k).await?;
                hits.retain(|hit| hit.score >= threshold);
                if hits.is_empty() {
                    tracing::warn!(threshold, "No documents met the score threshold");
                }
                hits
            }
            SearchType::Mmr {
                fetch_k,
                lambda_mult,
            } => {
                self.store
                    .max_marginal_relevance_search(query, k, fetch_k, lambda_mult)
                    .await?
            }
        };

        tracing::debug!(
            search_type = self.options.search_type.as_str(),
            hits = hits.len(),
            "Retrieved documents"
        );

        Ok(hits)
    }
}
