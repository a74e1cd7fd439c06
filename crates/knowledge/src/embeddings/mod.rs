//! Text embeddings.
//!
//! Provider-agnostic vector generation: hosted OpenAI models, a local
//! Ollama runtime, or the offline trigram hasher.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use catalog_qa_core::{AppConfig, AppResult};
use std::sync::Arc;

/// Build the embedding provider selected by application config.
pub fn provider_from_config(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let embedding_config = EmbeddingConfig::from_app_config(config);
    let api_key = config.resolve_api_key(&embedding_config.provider);
    create_provider(&embedding_config, api_key.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_provider_from_config_trigram() {
        let mut config = AppConfig::default();
        config.embedding_provider = "trigram".to_string();

        let provider = provider_from_config(&config).unwrap();
        let embeddings = provider
            .embed_documents(&["hello world".to_string(), "test embedding".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 384);
    }
}
