//! Vector store: an embedder paired with an in-memory index.

use crate::embeddings::EmbeddingProvider;
use crate::memory_index::{DistanceMetric, InMemoryIndex};
use crate::retriever::{Retriever, SearchOptions};
use crate::types::{Document, ScoredDocument, StoreStats};
use crate::vector_index::VectorIndex;
use catalog_qa_core::AppResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Searchable collection of embedded documents.
#[derive(Debug)]
pub struct VectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    index: InMemoryIndex,
    built_at: DateTime<Utc>,
}

impl VectorStore {
    /// Empty store scoring with `metric`.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, metric: DistanceMetric) -> Self {
        Self {
            embedder,
            index: InMemoryIndex::new(metric),
            built_at: Utc::now(),
        }
    }

    /// Embed `documents` and index them with cosine similarity.
    pub async fn from_documents(
        documents: Vec<Document>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let mut store = Self::new(embedder, DistanceMetric::Cosine);
        store.add_documents(documents).await?;
        Ok(store)
    }

    /// Embed and append documents. Returns how many were added.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn add_documents(&mut self, documents: Vec<Document>) -> AppResult<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let started = Instant::now();
        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;

        let count = documents.len();
        self.index.add(documents, embeddings)?;

        tracing::info!(
            documents = count,
            total = self.index.len(),
            provider = self.embedder.provider_name(),
            model = self.embedder.model_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Embedded documents"
        );

        Ok(count)
    }

    /// Top `k` documents for `query`.
    pub async fn similarity_search(&self, query: &str, k: usize) -> AppResult<Vec<Document>> {
        Ok(self
            .similarity_search_with_score(query, k)
            .await?
            .into_iter()
            .map(|hit| hit.document)
            .collect())
    }

    /// Top `k` documents for `query`, with scores.
    #[instrument(skip(self, query))]
    pub async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> AppResult<Vec<ScoredDocument>> {
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed_query(query).await?;
        self.similarity_search_by_vector(&embedding, k)
    }

    /// Top `k` documents for a precomputed query embedding.
    pub fn similarity_search_by_vector(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> AppResult<Vec<ScoredDocument>> {
        let hits = self.index.search(embedding, k)?;
        tracing::debug!(hits = hits.len(), "Similarity search complete");
        Ok(hits)
    }

    /// Diverse top `k` documents; see [`InMemoryIndex::max_marginal_relevance`].
    #[instrument(skip(self, query))]
    pub async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
        lambda_mult: f32,
    ) -> AppResult<Vec<ScoredDocument>> {
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed_query(query).await?;
        self.index
            .max_marginal_relevance(&embedding, k, fetch_k, lambda_mult)
    }

    /// Wrap the store in a retriever with fixed search options.
    pub fn as_retriever(self: &Arc<Self>, options: SearchOptions) -> Retriever {
        Retriever::new(Arc::clone(self), options)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.index.documents()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            documents: self.index.len(),
            dimensions: self.index.dimensions(),
            embedding_provider: self.embedder.provider_name().to_string(),
            embedding_model: self.embedder.model_name().to_string(),
            metric: self.index.metric().as_str().to_string(),
            built_at: self.built_at,
        }
    }
}
