//! Search command handler.
//!
//! Shows which catalog rows a query retrieves, without calling a chat model.

use super::{print_json, CsvArgs};
use catalog_qa_core::{config::AppConfig, AppResult};
use catalog_qa_knowledge::{build_index, SearchOptions};
use clap::Args;

/// Show the rows retrieved for a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    #[command(flatten)]
    pub csv: CsvArgs,

    /// Number of rows to return
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Diversify results with maximal marginal relevance, whatever
    /// retrieval.searchType says
    #[arg(long)]
    pub mmr: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    /// Configured search mode, with `-k` and `--mmr` applied.
    fn search_options(&self, config: &AppConfig) -> AppResult<SearchOptions> {
        let mut retrieval = config.retrieval.clone();

        if let Some(top_k) = self.top_k {
            retrieval.top_k = top_k;
        }
        if self.mmr {
            retrieval.search_type = "mmr".to_string();
            retrieval.fetch_k = retrieval.fetch_k.max(retrieval.top_k);
        }

        retrieval.validate()?;
        SearchOptions::from_config(&retrieval)
    }

    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let options = self.search_options(config)?;

        let index = build_index(config, &self.csv.paths, &self.csv.loader_options()?).await?;
        let hits = index
            .retriever(options)
            .relevant_documents(&self.query)
            .await?;

        tracing::debug!(
            search_type = options.search_type.as_str(),
            "Found {} results",
            hits.len()
        );

        if self.json {
            let results: Vec<_> = hits
                .iter()
                .map(|hit| {
                    serde_json::json!({
                        "score": hit.score,
                        "source": hit.document.metadata.source,
                        "row": hit.document.metadata.row,
                        "metadata": hit.document.metadata.extra,
                        "content": hit.document.page_content,
                    })
                })
                .collect();

            return print_json(&serde_json::json!({
                "query": self.query,
                "searchType": options.search_type.as_str(),
                "results": results,
            }));
        }

        if hits.is_empty() {
            println!("No results found");
            return Ok(());
        }

        for (rank, hit) in hits.iter().enumerate() {
            println!(
                "{}. [{:.3}] {} row {}",
                rank + 1,
                hit.score,
                hit.document.metadata.source,
                hit.document.metadata.row
            );
            for line in hit.document.page_content.lines() {
                println!("   {}", line);
            }
            println!();
        }

        Ok(())
    }
}
