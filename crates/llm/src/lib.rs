//! Chat model integration for catalog-qa.
//!
//! A provider-agnostic `LlmClient` trait with two implementations:
//! - **OpenAI**: hosted chat completions (default)
//! - **Ollama**: local runtime
//!
//! # Example
//! ```no_run
//! use catalog_qa_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new(std::env::var("OPENAI_API_KEY")?)?;
//! let request = LlmRequest::new("Hello, world!", "gpt-3.5-turbo").with_temperature(0.0);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage,
};
pub use factory::{create_client, ClientOptions};
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
