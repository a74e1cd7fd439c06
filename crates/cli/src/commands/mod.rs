//! Command handlers for the catalog-qa CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod docs;
pub mod embed;
pub mod prompts;
pub mod search;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use docs::DocsCommand;
pub use embed::EmbedCommand;
pub use prompts::PromptsCommand;
pub use search::SearchCommand;

use catalog_qa_core::{AppError, AppResult};
use catalog_qa_knowledge::CsvLoaderOptions;
use clap::Args;
use std::path::PathBuf;

/// CSV input flags shared by the commands that read a catalog.
#[derive(Args, Debug, Clone)]
pub struct CsvArgs {
    /// CSV file or directory of CSV files (repeatable)
    #[arg(long = "csv", required = true)]
    pub paths: Vec<PathBuf>,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Column whose value becomes the document source instead of the file path
    #[arg(long)]
    pub source_column: Option<String>,

    /// Column copied into document metadata and left out of the content (repeatable)
    #[arg(long = "metadata-column")]
    pub metadata_columns: Vec<String>,

    /// Restrict the page content to these columns (repeatable)
    #[arg(long = "content-column")]
    pub content_columns: Vec<String>,
}

impl CsvArgs {
    pub fn loader_options(&self) -> AppResult<CsvLoaderOptions> {
        if !self.delimiter.is_ascii() {
            return Err(AppError::Config(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }

        Ok(CsvLoaderOptions {
            delimiter: self.delimiter as u8,
            source_column: self.source_column.clone(),
            metadata_columns: self.metadata_columns.clone(),
            content_columns: self.content_columns.clone(),
            ..CsvLoaderOptions::default()
        })
    }
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
