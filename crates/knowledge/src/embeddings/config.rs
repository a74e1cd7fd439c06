//! Embedding configuration.

use catalog_qa_core::AppConfig;
use serde::{Deserialize, Serialize};

/// Model used by the offline provider.
pub const TRIGRAM_MODEL: &str = "trigram-v1";

/// Settings for one embedding provider instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "openai", "ollama", "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Expected vector length; `None` accepts whatever the model returns
    pub dimensions: Option<usize>,

    /// Whether to scale returned vectors to unit length
    #[serde(default)]
    pub normalize: bool,

    /// Maximum number of texts per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Base URL override
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout override, in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::for_model("openai", "text-embedding-ada-002")
    }
}

impl EmbeddingConfig {
    /// Config for a provider/model pair with known dimensions filled in.
    pub fn for_model(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            dimensions: known_dimensions(model),
            normalize: provider == "trigram",
            batch_size: default_batch_size(),
            endpoint: None,
            timeout_secs: None,
        }
    }

    /// Offline trigram config.
    pub fn trigram() -> Self {
        Self::for_model("trigram", TRIGRAM_MODEL)
    }

    /// Derive embedding settings from application config.
    ///
    /// The trigram provider has a single model, so a chat-oriented
    /// `embedding_model` left over from another provider is ignored.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let provider = config.embedding_provider.as_str();
        let model = if provider == "trigram" {
            TRIGRAM_MODEL
        } else {
            config.embedding_model.as_str()
        };

        Self {
            endpoint: config.resolve_endpoint(provider),
            timeout_secs: config.resolve_timeout(provider),
            ..Self::for_model(provider, model)
        }
    }
}

/// Output size of well-known embedding models.
pub fn known_dimensions(model: &str) -> Option<usize> {
    match model {
        "text-embedding-ada-002" | "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        "nomic-embed-text" => Some(768),
        "mxbai-embed-large" => Some(1024),
        "all-minilm" => Some(384),
        TRIGRAM_MODEL => Some(384),
        _ => None,
    }
}
