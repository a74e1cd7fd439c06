//! Ask command handler.
//!
//! Builds an index over the given catalog files and answers a question
//! about them with a retrieval QA chain.

use super::{print_json, CsvArgs};
use catalog_qa_core::{config::AppConfig, AppError, AppResult, RetrievalConfig};
use catalog_qa_knowledge::{
    answer_with_documents, build_index, rag::map_sources, ChainType, LlmSettings, RetrievalQa,
    SearchOptions, SourceRef, VectorStoreIndex,
};
use catalog_qa_llm::{create_client, ClientOptions, LlmClient, LlmUsage};
use clap::Args;
use futures::StreamExt;
use std::io::Write;

/// Answer a question from catalog rows
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    #[command(flatten)]
    pub csv: CsvArgs,

    /// Number of rows to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Chain type (stuff, map_reduce, refine, map_rerank)
    #[arg(long)]
    pub chain_type: Option<String>,

    /// Search type (similarity, similarity_score_threshold, mmr)
    #[arg(long)]
    pub search_type: Option<String>,

    /// Minimum score for the similarity_score_threshold search type
    #[arg(long)]
    pub score_threshold: Option<f32>,

    /// Temperature for response generation (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens in response
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Concatenate the retrieved rows into one prompt and call the model directly
    #[arg(long, conflicts_with_all = ["chain_type", "stream"])]
    pub direct: bool,

    /// Stream the answer as it is generated (stuff chain only)
    #[arg(long)]
    pub stream: bool,

    /// List the rows the answer was built from
    #[arg(long)]
    pub sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        if self.question.trim().is_empty() {
            return Err(AppError::Chain("Question cannot be empty".to_string()));
        }

        config.validate()?;
        let retrieval = self.retrieval_config(config);
        retrieval.validate()?;
        let options = SearchOptions::from_config(&retrieval)?;
        let chain_type = ChainType::parse(&retrieval.chain_type)?;

        let index = build_index(config, &self.csv.paths, &self.csv.loader_options()?).await?;

        let client = create_client(
            &config.provider,
            &ClientOptions::from_config(config, &config.provider),
        )?;
        let settings = LlmSettings::from_config(&config.model, &retrieval);

        if self.direct {
            return self
                .handle_direct(client.as_ref(), &index, options, &settings, config)
                .await;
        }

        let qa = RetrievalQa::new(client, index.retriever(options), settings)
            .with_chain_type(chain_type)
            .with_workspace(config.workspace.clone())
            .with_source_documents(self.sources || self.json);

        if self.stream {
            self.handle_streaming(&qa, config).await
        } else {
            self.handle_non_streaming(&qa, config).await
        }
    }

    /// Config retrieval settings with this command's flags applied.
    fn retrieval_config(&self, config: &AppConfig) -> RetrievalConfig {
        let mut retrieval = config.retrieval.clone();

        if let Some(top_k) = self.top_k {
            retrieval.top_k = top_k;
        }
        if let Some(ref chain_type) = self.chain_type {
            retrieval.chain_type = chain_type.clone();
        }
        if let Some(ref search_type) = self.search_type {
            retrieval.search_type = search_type.clone();
        }
        if let Some(threshold) = self.score_threshold {
            retrieval.score_threshold = threshold;
        }
        if let Some(temperature) = self.temperature {
            retrieval.temperature = temperature;
        }
        if self.max_tokens.is_some() {
            retrieval.max_tokens = self.max_tokens;
        }

        retrieval
    }

    /// Handle a complete (non-streaming) chain run.
    async fn handle_non_streaming(&self, qa: &RetrievalQa, config: &AppConfig) -> AppResult<()> {
        let response = qa.run(&self.question).await?;

        if self.json {
            print_json(&serde_json::json!({
                "answer": response.answer,
                "model": config.model,
                "provider": config.provider,
                "chainType": response.chain_type.as_str(),
                "llmCalls": response.llm_calls,
                "usage": usage_json(&response.usage),
                "sources": response.sources,
            }))?;
        } else {
            println!("{}", response.answer);
            if self.sources {
                print_sources(&response.sources);
            }
            log_usage(&response.usage);
        }

        Ok(())
    }

    /// Handle a streamed stuff-chain answer.
    async fn handle_streaming(&self, qa: &RetrievalQa, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting streaming request to LLM");

        let mut qa_stream = qa.stream(&self.question).await?;
        let mut full_content = String::new();
        let mut final_usage = None;

        while let Some(result) = qa_stream.stream.next().await {
            let chunk = result?;

            if !chunk.content.is_empty() {
                full_content.push_str(&chunk.content);

                if !self.json {
                    print!("{}", chunk.content);
                    std::io::stdout().flush().ok();
                }
            }

            // OpenAI reports usage in its own chunk just before [DONE]
            if chunk.usage.is_some() {
                final_usage = chunk.usage;
            }

            if chunk.done {
                break;
            }
        }

        let usage = final_usage.unwrap_or_default();

        if self.json {
            print_json(&serde_json::json!({
                "answer": full_content,
                "model": config.model,
                "provider": config.provider,
                "chainType": ChainType::Stuff.as_str(),
                "llmCalls": 1,
                "usage": usage_json(&usage),
                "sources": qa_stream.sources,
            }))?;
        } else {
            println!();
            if self.sources {
                print_sources(&qa_stream.sources);
            }
            log_usage(&usage);
        }

        Ok(())
    }

    /// Retrieve rows, concatenate them and ask the model in one call.
    async fn handle_direct(
        &self,
        client: &dyn LlmClient,
        index: &VectorStoreIndex,
        options: SearchOptions,
        settings: &LlmSettings,
        config: &AppConfig,
    ) -> AppResult<()> {
        tracing::info!("Answering with concatenated rows");

        let hits = index
            .retriever(options)
            .relevant_documents(self.question.trim())
            .await?;
        let documents: Vec<_> = hits.iter().map(|hit| hit.document.clone()).collect();

        let response =
            answer_with_documents(client, settings, &documents, self.question.trim()).await?;
        let sources = map_sources(&hits);

        if self.json {
            print_json(&serde_json::json!({
                "answer": response.content,
                "model": response.model,
                "provider": config.provider,
                "chainType": "direct",
                "llmCalls": 1,
                "usage": usage_json(&response.usage),
                "sources": sources,
            }))?;
        } else {
            println!("{}", response.content);
            if self.sources {
                print_sources(&sources);
            }
            log_usage(&response.usage);
        }

        Ok(())
    }
}

fn usage_json(usage: &LlmUsage) -> serde_json::Value {
    serde_json::json!({
        "promptTokens": usage.prompt_tokens,
        "completionTokens": usage.completion_tokens,
        "totalTokens": usage.total_tokens
    })
}

fn print_sources(sources: &[SourceRef]) {
    if sources.is_empty() {
        return;
    }

    println!();
    println!("Sources:");
    for source in sources {
        println!(
            "- {} ({}, score {:.3}): {}",
            source.source, source.location, source.score, source.snippet
        );
    }
}

fn log_usage(usage: &LlmUsage) {
    // Show usage stats if verbose (to stderr)
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        ask: AskCommand,
    }

    fn parse(args: &[&str]) -> AskCommand {
        let mut argv = vec!["catalog-qa"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).ask
    }

    fn offline_config() -> AppConfig {
        AppConfig {
            provider: "ollama".to_string(),
            embedding_provider: "trigram".to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_flags_override_retrieval_config() {
        let cmd = parse(&[
            "shirts?",
            "--csv",
            "a.csv",
            "-k",
            "7",
            "--chain-type",
            "refine",
            "--temperature",
            "0.7",
        ]);
        let retrieval = cmd.retrieval_config(&offline_config());

        assert_eq!(retrieval.top_k, 7);
        assert_eq!(retrieval.chain_type, "refine");
        assert_eq!(retrieval.temperature, 0.7);
        assert_eq!(retrieval.search_type, "similarity");
    }

    #[test]
    fn test_zero_top_k_flag_rejected() {
        let cmd = parse(&["shirts?", "--csv", "a.csv", "-k", "0"]);
        let config = offline_config();

        assert!(config.validate().is_ok());
        let err = cmd.retrieval_config(&config).validate().unwrap_err();
        assert!(err.to_string().contains("topK"));
    }

    #[tokio::test]
    async fn test_execute_rejects_zero_top_k_before_loading() {
        let cmd = parse(&["shirts?", "--csv", "does-not-exist.csv", "-k", "0"]);
        let err = cmd.execute(&offline_config()).await.unwrap_err();
        assert!(err.to_string().contains("topK"));
    }

    #[test]
    fn test_direct_conflicts_with_stream() {
        let result = TestCli::try_parse_from([
            "catalog-qa",
            "shirts?",
            "--csv",
            "a.csv",
            "--direct",
            "--stream",
        ]);
        assert!(result.is_err());
    }
}
