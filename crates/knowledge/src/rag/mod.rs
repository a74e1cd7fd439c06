//! RAG (Retrieval-Augmented Generation) answering.
//!
//! Answers natural language questions about catalog rows with a chat model.

pub mod chain;
mod combine;
pub mod direct;
pub mod index_creator;
pub mod sources;
pub mod types;

pub use chain::{QaStream, RetrievalQa};
pub use direct::answer_with_documents;
pub use index_creator::{IndexCreator, VectorStoreIndex};
pub use sources::map_sources;
pub use types::{ChainType, LlmSettings, QaResponse, SourceRef, NO_INFORMATION_ANSWER};
