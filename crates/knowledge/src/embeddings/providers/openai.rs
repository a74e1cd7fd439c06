//! OpenAI embeddings (`/v1/embeddings`).

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::provider::{
    check_dimensions, normalize_in_place, with_retries, AttemptError, EmbeddingProvider,
};
use async_trait::async_trait;
use catalog_qa_core::{AppError, AppResult};
use catalog_qa_llm::types::OPENAI_DEFAULT_ENDPOINT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const EMBEDDING_PATH: &str = "/v1/embeddings";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Hosted OpenAI embedding models.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddings {
    client: Client,
    base_url: String,
    api_key: String,
    config: EmbeddingConfig,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    pub fn new(config: EmbeddingConfig, api_key: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(
                config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for OpenAI: {}", e))
            })?;

        let base_url = config
            .endpoint
            .as_deref()
            .unwrap_or(OPENAI_DEFAULT_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            config,
        })
    }

    #[instrument(skip(self, texts), fields(batch = texts.len(), model = %self.config.model))]
    async fn embed_batch_once(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AttemptError> {
        let url = format!("{}{}", self.base_url, EMBEDDING_PATH);
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AttemptError::Retryable(AppError::Embedding(format!(
                    "Failed to send request to OpenAI: {}",
                    e
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::from_status(
                status,
                format!("OpenAI API error ({}): {}", status, error_message(&body)),
            ));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AttemptError::Fatal(AppError::Embedding(format!(
                "Failed to parse OpenAI embeddings response: {}",
                e
            )))
        })?;

        into_ordered(body, texts.len()).map_err(AttemptError::Fatal)
    }
}

/// Pull the `error.message` out of an OpenAI error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Order vectors by their `index` field and check none are missing.
fn into_ordered(response: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(AppError::Embedding(format!(
            "OpenAI returned {} embeddings for {} inputs",
            data.len(),
            expected
        )));
    }

    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(AppError::Embedding(
            "OpenAI embeddings response has gaps in its indices".to_string(),
        ));
    }

    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimensions(&self) -> Option<usize> {
        self.config.dimensions
    }

    #[instrument(skip(self, texts), fields(count = texts.len(), provider = "openai"))]
    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size.max(1)) {
            debug!("Embedding batch of {} texts", batch.len());
            let vectors = with_retries("OpenAI embedding", || self.embed_batch_once(batch)).await?;
            embeddings.extend(vectors);
        }

        check_dimensions(&embeddings, self.config.dimensions, &self.config.model)?;

        if self.config.normalize {
            embeddings.iter_mut().for_each(|e| normalize_in_place(e));
        }

        Ok(embeddings)
    }
}
