//! Chat client factory.
//!
//! Turns a provider name plus resolved settings into a ready client.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use catalog_qa_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;

/// Settings a provider may need; anything left `None` falls back to the
/// provider default.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub organization: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ClientOptions {
    /// Resolve the options for `provider` from application config.
    pub fn from_config(config: &AppConfig, provider: &str) -> Self {
        Self {
            endpoint: config.resolve_endpoint(provider),
            api_key: config.resolve_api_key(provider),
            organization: config.resolve_organization(provider),
            timeout_secs: config.resolve_timeout(provider),
        }
    }
}

/// Create a chat client for the named provider.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required API
/// key is missing, `AppError::Llm` if the HTTP client cannot be built.
pub fn create_client(provider: &str, options: &ClientOptions) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider).ok_or_else(|| {
        AppError::Config(format!(
            "Unknown provider: {}. Supported: openai, ollama",
            provider
        ))
    })?;

    let endpoint = options
        .endpoint
        .as_deref()
        .unwrap_or(provider_type.default_endpoint());
    let timeout = options
        .timeout_secs
        .unwrap_or(provider_type.default_timeout_secs());

    tracing::debug!(provider = provider_type.as_str(), endpoint, "Creating chat client");

    match provider_type {
        ProviderType::OpenAI => {
            let api_key = options.api_key.as_deref().ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key (set OPENAI_API_KEY)".to_string())
            })?;
            let client = OpenAiClient::with_options(
                endpoint,
                api_key,
                options.organization.clone(),
                timeout,
            )?;
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_timeout(endpoint, timeout)?)),
    }
}
