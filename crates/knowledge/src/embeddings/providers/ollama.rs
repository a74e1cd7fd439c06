//! Ollama Embedding Provider
//!
//! Calls a local Ollama runtime's batch endpoint (`/api/embed`) with models
//! such as `nomic-embed-text`.
//!
//! # Example
//! ```no_run
//! use catalog_qa_knowledge::embeddings::{EmbeddingConfig, EmbeddingProvider};
//! use catalog_qa_knowledge::embeddings::providers::OllamaEmbeddings;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EmbeddingConfig::for_model("ollama", "nomic-embed-text");
//! let provider = OllamaEmbeddings::new(config)?;
//! let embedding = provider.embed_query("rain jacket").await?;
//! assert_eq!(embedding.len(), 768);
//! # Ok(())
//! # }
//! ```

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::provider::{
    check_dimensions, normalize_in_place, with_retries, AttemptError, EmbeddingProvider,
};
use async_trait::async_trait;
use catalog_qa_core::{AppError, AppResult};
use catalog_qa_llm::types::OLLAMA_DEFAULT_ENDPOINT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const EMBEDDING_PATH: &str = "/api/embed";

/// Request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ollama embedding provider using the local API
#[derive(Debug, Clone)]
pub struct OllamaEmbeddings {
    /// HTTP client for API requests
    client: Client,
    /// Ollama API base URL
    base_url: String,
    config: EmbeddingConfig,
}

/// Request payload for the batch embeddings API
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Error response from Ollama API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaEmbeddings {
    /// Create a provider. No request is made until the first embed call.
    pub fn new(config: EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(
                config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        let base_url = config
            .endpoint
            .as_deref()
            .unwrap_or(OLLAMA_DEFAULT_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Embed one batch (no retries)
    #[instrument(skip(self, texts), fields(batch = texts.len(), model = %self.config.model))]
    async fn embed_batch_once(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AttemptError> {
        let url = format!("{}{}", self.base_url, EMBEDDING_PATH);
        let request = EmbedRequest {
            model: &self.config.model,
            input: texts,
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AttemptError::Retryable(AppError::Embedding(format!(
                    "Ollama not reachable at {} ({}). Ensure Ollama is running and run: ollama pull {}",
                    self.base_url, e, self.config.model
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            return Err(AttemptError::from_status(
                status,
                format!("Ollama API error ({}): {}", status, message),
            ));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            AttemptError::Fatal(AppError::Embedding(format!(
                "Failed to parse Ollama response: {}",
                e
            )))
        })?;

        if body.embeddings.len() != texts.len() {
            return Err(AttemptError::Fatal(AppError::Embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                body.embeddings.len(),
                texts.len()
            ))));
        }

        Ok(body.embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimensions(&self) -> Option<usize> {
        self.config.dimensions
    }

    #[instrument(skip(self, texts), fields(count = texts.len(), provider = "ollama"))]
    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size.max(1)) {
            let vectors = with_retries("Ollama embedding", || self.embed_batch_once(batch)).await?;
            embeddings.extend(vectors);
        }

        check_dimensions(&embeddings, self.config.dimensions, &self.config.model)?;

        if self.config.normalize {
            embeddings.iter_mut().for_each(|e| normalize_in_place(e));
        }

        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let provider =
            OllamaEmbeddings::new(EmbeddingConfig::for_model("ollama", "nomic-embed-text")).unwrap();
        assert_eq!(provider.base_url, "http://localhost:11434");
        assert_eq!(provider.dimensions(), Some(768));
        assert_eq!(provider.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_request_serialization() {
        let input = vec!["a".to_string(), "b".to_string()];
        let request = EmbedRequest {
            model: "nomic-embed-text",
            input: &input,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "nomic-embed-text", "input": ["a", "b"]})
        );
    }

    #[test]
    fn test_response_parsing() {
        let body: EmbedResponse = serde_json::from_str(
            r#"{"model": "nomic-embed-text", "embeddings": [[0.1, 0.2], [0.3, 0.4]]}"#,
        )
        .unwrap();
        assert_eq!(body.embeddings.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error() {
        let config = EmbeddingConfig {
            endpoint: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: Some(1),
            ..EmbeddingConfig::for_model("ollama", "nomic-embed-text")
        };
        let provider = OllamaEmbeddings::new(config).unwrap();
        let err = provider
            .embed_documents(&["boots".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Ollama not reachable"));
    }
}
