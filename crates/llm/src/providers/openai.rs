//! OpenAI chat completion provider.
//!
//! Talks to `POST {base_url}/v1/chat/completions`. Any OpenAI-compatible
//! server (Azure proxies, LM Studio, vLLM) works by pointing `endpoint` at it.

use crate::client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage,
};
use crate::providers::lines::lines;
use crate::types::OPENAI_DEFAULT_ENDPOINT;
use catalog_qa_core::{AppError, AppResult};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// OpenAI chat client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    organization: Option<String>,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client against the public OpenAI API.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_options(OPENAI_DEFAULT_ENDPOINT, api_key, None, 60)
    }

    /// Create a client with a custom base URL, organization and timeout.
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        organization: Option<String>,
        timeout_secs: u64,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client for OpenAI: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            organization,
            client,
        })
    }

    fn to_openai_request(&self, request: &LlmRequest, stream: bool) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.model.clone(),
            messages: request.messages(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    fn convert_response(&self, response: ChatCompletionResponse) -> AppResult<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("OpenAI returned no choices".to_string()))?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!("OpenAI completion was truncated by max_tokens");
        }

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            usage,
            done: true,
        })
    }

    fn request_builder(&self, body: &ChatCompletionRequest) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH);

        let builder = self.client.post(&url).bearer_auth(&self.api_key).json(body);
        match self.organization {
            Some(ref org) => builder.header("OpenAI-Organization", org),
            None => builder,
        }
    }

    async fn post(&self, body: &ChatCompletionRequest) -> AppResult<reqwest::Response> {
        let response = self
            .request_builder(body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "OpenAI API error ({}): {}",
                status,
                error_message(&error_text)
            )));
        }

        Ok(response)
    }
}

/// Pull `error.message` out of an OpenAI error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Parse one server-sent-event line into a stream chunk.
///
/// Returns `None` for lines that carry nothing (comments, events, empty deltas).
fn parse_sse_line(line: &str, model: &str) -> Option<AppResult<LlmStreamChunk>> {
    let data = line.strip_prefix("data:")?.trim();

    if data == "[DONE]" {
        return Some(Ok(LlmStreamChunk {
            content: String::new(),
            model: model.to_string(),
            done: true,
            usage: None,
        }));
    }

    let chunk: ChatCompletionChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(Err(AppError::Llm(format!(
                "Failed to parse OpenAI stream chunk: {}",
                e
            ))))
        }
    };

    let content: String = chunk
        .choices
        .iter()
        .filter_map(|c| c.delta.content.as_deref())
        .collect();
    let usage = chunk
        .usage
        .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens));

    if content.is_empty() && usage.is_none() {
        return None;
    }

    Some(Ok(LlmStreamChunk {
        content,
        model: if chunk.model.is_empty() {
            model.to_string()
        } else {
            chunk.model
        },
        done: false,
        usage,
    }))
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(model = %request.model, "Sending chat completion request to OpenAI");
        tracing::debug!("Request: {:?}", request);

        let body = self.to_openai_request(request, false);
        let response = self.post(&body).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse OpenAI response: {}", e)))?;

        let response = self.convert_response(completion)?;
        tracing::info!(
            total_tokens = response.usage.total_tokens,
            "Received completion from OpenAI"
        );

        Ok(response)
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::info!(model = %request.model, "Starting streaming request to OpenAI");

        let body = self.to_openai_request(request, true);
        let response = self.post(&body).await?;

        let model = request.model.clone();
        let stream = lines(response.bytes_stream()).filter_map(move |line| {
            let item = match line {
                Ok(line) => parse_sse_line(&line, &model),
                Err(e) => Some(Err(AppError::Llm(format!("Stream error: {}", e)))),
            };
            futures::future::ready(item)
        });

        Ok(Box::pin(stream))
    }
}
