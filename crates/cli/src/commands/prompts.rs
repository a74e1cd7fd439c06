//! Prompts command handler.

use super::print_json;
use catalog_qa_core::{config::AppConfig, AppResult};
use catalog_qa_prompt::{list_prompts, load_prompt};
use clap::Args;

/// List prompt templates
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        let mut templates = Vec::new();
        for id in list_prompts(&config.workspace)? {
            match load_prompt(&config.workspace, &id) {
                Ok(template) => templates.push(template),
                Err(e) => tracing::warn!("Skipping prompt '{}': {}", id, e),
            }
        }

        if self.json {
            let entries: Vec<_> = templates
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id,
                        "title": t.title,
                        "inputVariables": t.input_variables,
                    })
                })
                .collect();
            return print_json(&serde_json::json!(entries));
        }

        for template in &templates {
            println!("{:<24} {}", template.id, template.title);
        }

        Ok(())
    }
}
