//! RAG response types.

use catalog_qa_core::{AppError, AppResult, RetrievalConfig};
use catalog_qa_llm::{LlmRequest, LlmUsage};
use serde::{Deserialize, Serialize};

/// Answer returned when a multi-call chain has no documents to work with.
pub const NO_INFORMATION_ANSWER: &str =
    "I could not find any products in the catalog that answer this question.";

/// How retrieved documents are combined into an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainType {
    /// Every document in one prompt
    #[default]
    Stuff,
    /// One extraction call per document, then one combining call
    MapReduce,
    /// Answer from the first document, refined by each following one
    Refine,
    /// One scored answer per document; the best one wins
    MapRerank,
}

impl ChainType {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "stuff" => Ok(Self::Stuff),
            "map_reduce" => Ok(Self::MapReduce),
            "refine" => Ok(Self::Refine),
            "map_rerank" => Ok(Self::MapRerank),
            _ => Err(AppError::Config(format!(
                "Unknown chain type: {}. Supported: stuff, map_reduce, refine, map_rerank",
                s
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stuff => "stuff",
            Self::MapReduce => "map_reduce",
            Self::Refine => "refine",
            Self::MapRerank => "map_rerank",
        }
    }
}

/// Chat model settings shared by every call a chain makes.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl LlmSettings {
    /// Deterministic sampling (temperature 0) with no token cap.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
        }
    }

    pub fn from_config(model: impl Into<String>, retrieval: &RetrievalConfig) -> Self {
        Self {
            model: model.into(),
            temperature: retrieval.temperature,
            max_tokens: retrieval.max_tokens,
        }
    }

    /// Apply these settings to a request.
    pub fn request(&self, prompt: impl Into<String>) -> LlmRequest {
        let request =
            LlmRequest::new(prompt, self.model.clone()).with_temperature(self.temperature);
        match self.max_tokens {
            Some(max) => request.with_max_tokens(max),
            None => request,
        }
    }
}

/// A single catalog row used to answer a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// File path, or the configured source column value
    pub source: String,

    /// Human-readable location, e.g. "row 12"
    pub location: String,

    /// Retrieval score
    pub score: f32,

    /// Start of the row text (truncated if needed)
    pub snippet: String,
}

/// Response from a retrieval QA run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResponse {
    /// Model answer, usually markdown
    pub answer: String,

    /// Rows the answer was built from (empty unless requested)
    pub sources: Vec<SourceRef>,

    pub chain_type: ChainType,

    /// Token usage summed over every model call
    pub usage: LlmUsage,

    /// Number of model calls made
    pub llm_calls: u32,

    /// Internal: highest retrieval score, used for logging
    #[serde(skip_serializing, default)]
    pub max_score: f32,
}
