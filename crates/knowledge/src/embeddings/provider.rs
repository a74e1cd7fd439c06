//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::providers::{OllamaEmbeddings, OpenAiEmbeddings, TrigramProvider};
use catalog_qa_core::{AppError, AppResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Maximum attempts for one embedding request
pub(crate) const MAX_ATTEMPTS: u32 = 3;

/// Backoff before the first retry, doubled after each failure
pub(crate) const INITIAL_BACKOFF_MS: u64 = 100;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "openai", "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Expected vector length, when known up front
    fn dimensions(&self) -> Option<usize>;

    /// Embed many texts, returning one vector per input in input order.
    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_documents(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
///
/// # Errors
/// Returns `AppError::Config` for an unknown provider or a missing OpenAI key.
pub fn create_provider(
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    tracing::debug!(
        provider = %config.provider,
        model = %config.model,
        dimensions = ?config.dimensions,
        "Creating embedding provider"
    );

    match config.provider.as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(
                    "OpenAI embeddings require API key (set OPENAI_API_KEY)".to_string(),
                )
            })?;
            Ok(Arc::new(OpenAiEmbeddings::new(config.clone(), api_key)?))
        }

        "ollama" => Ok(Arc::new(OllamaEmbeddings::new(config.clone())?)),

        "trigram" => Ok(Arc::new(TrigramProvider::new(
            config.dimensions.unwrap_or(384),
        ))),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, ollama, trigram",
            config.provider
        ))),
    }
}

/// Outcome of a single failed HTTP attempt.
#[derive(Debug)]
pub(crate) enum AttemptError {
    /// Network failure, rate limit or server error
    Retryable(AppError),
    /// Anything a retry cannot fix
    Fatal(AppError),
}

impl AttemptError {
    /// Classify a non-success HTTP status.
    pub(crate) fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        let err = AppError::Embedding(message);
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Self::Retryable(err)
        } else {
            Self::Fatal(err)
        }
    }
}

/// Run `op` up to [`MAX_ATTEMPTS`] times with exponential backoff.
pub(crate) async fn with_retries<T, F, Fut>(label: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Retryable(e)) if attempt >= MAX_ATTEMPTS => return Err(e),
            Err(AttemptError::Retryable(e)) => {
                let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt - 1);
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying in {}ms: {}",
                    label,
                    attempt,
                    MAX_ATTEMPTS,
                    backoff_ms,
                    e
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Check every vector against the expected length.
pub(crate) fn check_dimensions(
    embeddings: &[Vec<f32>],
    expected: Option<usize>,
    model: &str,
) -> AppResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    match embeddings.iter().find(|e| e.len() != expected) {
        Some(bad) => Err(AppError::Embedding(format!(
            "Model '{}' returned {} dimensions, expected {}",
            model,
            bad.len(),
            expected
        ))),
        None => Ok(()),
    }
}

/// Scale a vector to unit length. Zero vectors are left alone.
pub(crate) fn normalize_in_place(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in embedding.iter_mut() {
            *v /= norm;
        }
    }
}
