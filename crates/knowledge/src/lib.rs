//! Retrieval over CSV product catalogs.
//!
//! Loads catalog rows as documents, embeds them into an in-memory vector
//! store and answers questions about them with retrieval QA chains.

pub mod embeddings;
pub mod loader;
pub mod memory_index;
pub mod rag;
pub mod retriever;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use loader::{load_paths, CsvLoader, CsvLoaderOptions};
pub use memory_index::{DistanceMetric, InMemoryIndex};
pub use rag::{
    answer_with_documents, ChainType, IndexCreator, LlmSettings, QaResponse, RetrievalQa,
    SourceRef, VectorStoreIndex,
};
pub use retriever::{Retriever, SearchOptions, SearchType};
pub use store::VectorStore;
pub use types::{Document, DocumentMetadata, ScoredDocument, StoreStats};
pub use vector_index::VectorIndex;

use catalog_qa_core::{AppConfig, AppError, AppResult};
use std::path::PathBuf;
use std::time::Instant;

/// Load, embed and index every CSV under `paths` using the embedding
/// provider selected by `config`.
pub async fn build_index(
    config: &AppConfig,
    paths: &[PathBuf],
    options: &CsvLoaderOptions,
) -> AppResult<VectorStoreIndex> {
    let start = Instant::now();

    let files = loader::expand_paths(paths)?;
    if files.is_empty() {
        return Err(AppError::Loader(format!(
            "No CSV files found in {:?}",
            paths
        )));
    }

    let loaders: Vec<CsvLoader> = files
        .into_iter()
        .map(|file| CsvLoader::new(file).with_options(options.clone()))
        .collect();

    let embedder = embeddings::provider_from_config(config)?;
    let index = IndexCreator::new(embedder).from_loaders(&loaders).await?;

    let stats = index.store().stats();
    tracing::info!(
        files = loaders.len(),
        documents = stats.documents,
        embedding_model = %stats.embedding_model,
        duration_ms = start.elapsed().as_millis() as u64,
        "Catalog index ready"
    );

    Ok(index)
}
