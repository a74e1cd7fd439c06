//! Embedding provider implementations.

pub mod ollama;
pub mod openai;
pub mod trigram;

pub use ollama::OllamaEmbeddings;
pub use openai::OpenAiEmbeddings;
pub use trigram::TrigramProvider;
