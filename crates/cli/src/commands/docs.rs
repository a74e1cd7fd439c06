//! Docs command handler.
//!
//! Prints catalog rows exactly as they will be embedded.

use super::{print_json, CsvArgs};
use catalog_qa_core::{config::AppConfig, AppResult};
use catalog_qa_knowledge::load_paths;
use clap::Args;

/// Print the documents loaded from CSV files
#[derive(Args, Debug)]
pub struct DocsCommand {
    #[command(flatten)]
    pub csv: CsvArgs,

    /// Print at most this many documents
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DocsCommand {
    pub fn execute(&self, _config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing docs command");

        let documents = load_paths(&self.csv.paths, &self.csv.loader_options()?)?;
        let total = documents.len();
        let shown = self.limit.unwrap_or(total).min(total);

        if self.json {
            return print_json(&serde_json::json!({
                "total": total,
                "documents": &documents[..shown],
            }));
        }

        for document in &documents[..shown] {
            println!("--- {} row {}", document.metadata.source, document.metadata.row);
            for (key, value) in &document.metadata.extra {
                println!("# {}: {}", key, value);
            }
            println!("{}", document.page_content);
            println!();
        }
        println!("{} of {} documents", shown, total);

        Ok(())
    }
}
