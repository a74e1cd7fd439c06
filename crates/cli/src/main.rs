//! catalog-qa CLI
//!
//! Main entry point for the catalog-qa command-line tool.
//! Answers questions about CSV product catalogs with retrieval-augmented chat.

mod commands;

use anyhow::Context;
use catalog_qa_core::{config::AppConfig, logging, ConfigOverrides};
use clap::{Parser, Subcommand};
use commands::{AskCommand, DocsCommand, EmbedCommand, PromptsCommand, SearchCommand};
use std::path::PathBuf;

/// catalog-qa - question answering over CSV product catalogs
#[derive(Parser, Debug)]
#[command(name = "catalog-qa")]
#[command(about = "Question answering over CSV product catalogs", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "CATALOG_QA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "CATALOG_QA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Chat provider (openai, ollama)
    #[arg(short, long, global = true, env = "CATALOG_QA_PROVIDER")]
    provider: Option<String>,

    /// Chat model identifier
    #[arg(short, long, global = true, env = "CATALOG_QA_MODEL")]
    model: Option<String>,

    /// Embedding provider (openai, ollama, trigram)
    #[arg(long, global = true, env = "CATALOG_QA_EMBEDDING_PROVIDER")]
    embedding_provider: Option<String>,

    /// Embedding model identifier
    #[arg(long, global = true, env = "CATALOG_QA_EMBEDDING_MODEL")]
    embedding_model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question from catalog rows
    Ask(AskCommand),

    /// Show the rows retrieved for a query
    Search(SearchCommand),

    /// Embed a text and print its vector
    Embed(EmbedCommand),

    /// Print the documents loaded from CSV files
    Docs(DocsCommand),

    /// List prompt templates
    Prompts(PromptsCommand),
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            workspace: self.workspace.clone(),
            config_file: self.config.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            embedding_provider: self.embedding_provider.clone(),
            embedding_model: self.embedding_model.clone(),
            log_level: self.log_level.clone(),
            log_json: self.log_json,
            verbose: self.verbose,
            no_color: self.no_color,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();
    let overrides = cli.overrides();

    // Workspace and config file must be known before the file is read;
    // the second pass keeps CLI flags ahead of file and environment values.
    let config = AppConfig::default()
        .with_overrides(overrides.clone())
        .reload()
        .context("Failed to load configuration")?
        .with_overrides(overrides);

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {} ({})", config.provider, config.model);
    tracing::debug!(
        "Embeddings: {} ({})",
        config.embedding_provider,
        config.embedding_model
    );

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
        Commands::Embed(_) => "embed",
        Commands::Docs(_) => "docs",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Embed(cmd) => cmd.execute(&config).await,
        Commands::Docs(cmd) => cmd.execute(&config),
        Commands::Prompts(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::debug!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.with_context(|| format!("catalog-qa {} failed", command_name))
}
