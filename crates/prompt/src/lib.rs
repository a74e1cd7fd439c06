//! Prompt templates for catalog-qa.
//!
//! - Built-in question-answering templates for each chain strategy
//! - YAML overrides from `.catalog-qa/prompts/`
//! - Handlebars rendering into system + user messages

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{list_prompts, load_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptTemplate};
