//! Embed command handler.

use super::print_json;
use catalog_qa_core::{config::AppConfig, AppResult};
use catalog_qa_knowledge::embeddings::provider_from_config;
use clap::Args;

/// Embed a text and print its vector
#[derive(Args, Debug)]
pub struct EmbedCommand {
    /// Text to embed
    pub text: String,

    /// Number of leading components to print
    #[arg(long, default_value_t = 5)]
    pub head: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl EmbedCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing embed command");

        let provider = provider_from_config(config)?;
        let vector = provider.embed_query(&self.text).await?;
        let head = &vector[..self.head.min(vector.len())];

        if self.json {
            return print_json(&serde_json::json!({
                "provider": provider.provider_name(),
                "model": provider.model_name(),
                "dimensions": vector.len(),
                "head": head,
            }));
        }

        println!("Provider:   {}", provider.provider_name());
        println!("Model:      {}", provider.model_name());
        println!("Dimensions: {}", vector.len());
        let formatted: Vec<String> = head.iter().map(|v| format!("{:.6}", v)).collect();
        println!("Head:       [{}]", formatted.join(", "));

        Ok(())
    }
}
