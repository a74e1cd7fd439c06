//! One-call index building and querying.

use crate::embeddings::EmbeddingProvider;
use crate::loader::CsvLoader;
use crate::memory_index::DistanceMetric;
use crate::rag::chain::RetrievalQa;
use crate::rag::types::{LlmSettings, QaResponse};
use crate::retriever::{Retriever, SearchOptions};
use crate::store::VectorStore;
use crate::types::Document;
use catalog_qa_core::AppResult;
use catalog_qa_llm::LlmClient;
use std::sync::Arc;

/// Builds a [`VectorStoreIndex`] from loaders.
#[derive(Debug, Clone)]
pub struct IndexCreator {
    embedder: Arc<dyn EmbeddingProvider>,
    metric: DistanceMetric,
}

impl IndexCreator {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            metric: DistanceMetric::Cosine,
        }
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Load every loader, then embed and index all rows.
    pub async fn from_loaders(&self, loaders: &[CsvLoader]) -> AppResult<VectorStoreIndex> {
        let mut documents = Vec::new();
        for loader in loaders {
            documents.extend(loader.load()?);
        }
        self.from_documents(documents).await
    }

    pub async fn from_documents(&self, documents: Vec<Document>) -> AppResult<VectorStoreIndex> {
        let mut store = VectorStore::new(Arc::clone(&self.embedder), self.metric);
        store.add_documents(documents).await?;
        Ok(VectorStoreIndex {
            store: Arc::new(store),
        })
    }
}

/// A built store with stuff-chain query helpers.
#[derive(Debug, Clone)]
pub struct VectorStoreIndex {
    store: Arc<VectorStore>,
}

impl VectorStoreIndex {
    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    pub fn retriever(&self, options: SearchOptions) -> Retriever {
        self.store.as_retriever(options)
    }

    /// Answer with the stuff chain over the default top-4 rows.
    pub async fn query(
        &self,
        question: &str,
        llm: Arc<dyn LlmClient>,
        settings: &LlmSettings,
    ) -> AppResult<String> {
        Ok(self.query_with_sources(question, llm, settings).await?.answer)
    }

    /// Like [`query`](Self::query), keeping the source rows.
    pub async fn query_with_sources(
        &self,
        question: &str,
        llm: Arc<dyn LlmClient>,
        settings: &LlmSettings,
    ) -> AppResult<QaResponse> {
        RetrievalQa::new(llm, self.retriever(SearchOptions::default()), settings.clone())
            .with_source_documents(true)
            .run(question)
            .await
    }
}
