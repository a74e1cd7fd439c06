//! Configuration management for catalog-qa.
//!
//! Configuration is merged from several sources, lowest precedence first:
//! - Built-in defaults
//! - The workspace config file (`.catalog-qa/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! Nothing is ever written back; the index lives in memory for one run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Name of the per-workspace configuration directory.
pub const CONFIG_DIR: &str = ".catalog-qa";

/// Chat providers the factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Embedding providers the factory knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 3] = ["openai", "ollama", "trigram"];

/// Environment variable consulted for OpenAI when nothing else names a key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains `.catalog-qa/`)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Chat completion provider ("openai", "ollama")
    pub provider: String,

    /// Chat model identifier
    pub model: String,

    /// Embedding provider ("openai", "ollama", "trigram")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Explicit API key (`CATALOG_QA_API_KEY`)
    pub api_key: Option<String>,

    /// Retrieval and answering settings
    pub retrieval: RetrievalConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit logs as JSON
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider table from config.yaml
    pub llm: Option<LlmConfig>,
}

/// Retrieval settings (`retrieval:` section of config.yaml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Number of documents handed to the chain
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// "stuff", "map_reduce", "refine" or "map_rerank"
    #[serde(default = "default_chain_type")]
    pub chain_type: String,

    /// "similarity", "similarity_score_threshold" or "mmr"
    #[serde(default = "default_search_type")]
    pub search_type: String,

    /// Minimum score for `similarity_score_threshold`
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Candidate pool size for MMR
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// MMR diversity weight (1.0 = pure relevance)
    #[serde(default = "default_lambda_mult")]
    pub lambda_mult: f32,

    /// Sampling temperature for the chat model
    #[serde(default)]
    pub temperature: f32,

    /// Completion token cap
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_top_k() -> usize {
    4
}

fn default_chain_type() -> String {
    "stuff".to_string()
}

fn default_search_type() -> String {
    "similarity".to_string()
}

fn default_score_threshold() -> f32 {
    0.5
}

fn default_fetch_k() -> usize {
    20
}

fn default_lambda_mult() -> f32 {
    0.5
}

/// Chat model used when a provider is picked without naming one.
pub fn default_chat_model(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("gpt-3.5-turbo"),
        "ollama" => Some("llama3.2"),
        _ => None,
    }
}

/// Embedding model used when a provider is picked without naming one.
pub fn default_embedding_model(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("text-embedding-ada-002"),
        "ollama" => Some("nomic-embed-text"),
        _ => None,
    }
}

impl RetrievalConfig {
    /// Reject settings no retriever can honour.
    pub fn validate(&self) -> AppResult<()> {
        if self.top_k == 0 {
            return Err(AppError::Config("retrieval.topK must be at least 1".to_string()));
        }

        if !(0.0..=1.0).contains(&self.lambda_mult) {
            return Err(AppError::Config(format!(
                "retrieval.lambdaMult must be within [0, 1], got {}",
                self.lambda_mult
            )));
        }

        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            chain_type: default_chain_type(),
            search_type: default_search_type(),
            score_threshold: default_score_threshold(),
            fetch_k: default_fetch_k(),
            lambda_mult: default_lambda_mult(),
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(rename = "activeEmbeddingProvider")]
    pub active_embedding_provider: Option<String>,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
        #[serde(rename = "organizationEnv")]
        organization_env: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Chat model named by this provider entry.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Embedding model named by this provider entry, if any.
    pub fn embedding_model(&self) -> Option<&str> {
        match self {
            Self::OpenAI {
                embedding_model, ..
            }
            | Self::Ollama {
                embedding_model, ..
            } => embedding_model.as_deref(),
        }
    }

    /// Endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    retrieval: Option<RetrievalConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub workspace: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub embedding_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub log_level: Option<String>,
    pub log_json: bool,
    pub verbose: bool,
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            embedding_provider: "openai".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            api_key: None,
            retrieval: RetrievalConfig::default(),
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the workspace config file and the
    /// environment.
    ///
    /// Environment variables:
    /// - `CATALOG_QA_WORKSPACE`: Override workspace path
    /// - `CATALOG_QA_CONFIG`: Path to config file
    /// - `CATALOG_QA_PROVIDER` / `CATALOG_QA_MODEL`: Chat provider and model
    /// - `CATALOG_QA_EMBEDDING_PROVIDER` / `CATALOG_QA_EMBEDDING_MODEL`
    /// - `CATALOG_QA_API_KEY`: API key for hosted providers
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use catalog_qa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Chat model: {}", config.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("CATALOG_QA_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("CATALOG_QA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        config.reload()
    }

    /// Re-read the config file and environment on top of the current
    /// workspace and config file settings.
    pub fn reload(mut self) -> AppResult<Self> {
        if !self.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                self.workspace
            )));
        }

        let config_path = self
            .config_file
            .clone()
            .unwrap_or_else(|| self.config_dir().join("config.yaml"));

        if config_path.exists() {
            self = self.merge_yaml(&config_path)?;
        } else if self.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        if let Ok(provider) = std::env::var("CATALOG_QA_PROVIDER") {
            self.switch_provider(provider);
        }

        if let Ok(model) = std::env::var("CATALOG_QA_MODEL") {
            self.model = model;
        }

        if let Ok(provider) = std::env::var("CATALOG_QA_EMBEDDING_PROVIDER") {
            self.switch_embedding_provider(provider);
        }

        if let Ok(model) = std::env::var("CATALOG_QA_EMBEDDING_MODEL") {
            self.embedding_model = model;
        }

        if let Ok(key) = std::env::var("CATALOG_QA_API_KEY") {
            self.api_key = Some(key);
        }

        if self.log_level.is_none() {
            self.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var_os("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(self)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            if let Some(ref embedding_provider) = llm.active_embedding_provider {
                result.embedding_provider = embedding_provider.clone();
                if let Some(model) = llm
                    .providers
                    .get(embedding_provider)
                    .and_then(|pc| pc.embedding_model())
                {
                    result.embedding_model = model.to_string();
                }
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and environment.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(workspace) = overrides.workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = overrides.config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = overrides.provider {
            self.switch_provider(provider);
        }

        if let Some(model) = overrides.model {
            self.model = model;
        }

        if let Some(provider) = overrides.embedding_provider {
            self.switch_embedding_provider(provider);
        }

        if let Some(model) = overrides.embedding_model {
            self.embedding_model = model;
        }

        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }

        if overrides.verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        self.log_json |= overrides.log_json;
        self.no_color |= overrides.no_color;

        self
    }

    /// Select a chat provider. A different provider also brings its own
    /// model, from its config entry or else its default; an explicit model
    /// set afterwards still wins.
    fn switch_provider(&mut self, provider: String) {
        if provider != self.provider {
            let model = self
                .get_provider_config(&provider)
                .map(|pc| pc.model().to_string())
                .or_else(|| default_chat_model(&provider).map(str::to_string));
            if let Some(model) = model {
                self.model = model;
            }
        }
        self.provider = provider;
    }

    /// Embedding counterpart of [`Self::switch_provider`].
    fn switch_embedding_provider(&mut self, provider: String) {
        if provider != self.embedding_provider {
            let model = self
                .get_provider_config(&provider)
                .and_then(|pc| pc.embedding_model())
                .map(str::to_string)
                .or_else(|| default_embedding_model(&provider).map(str::to_string));
            if let Some(model) = model {
                self.embedding_model = model;
            }
        }
        self.embedding_provider = provider;
    }

    /// Path to the `.catalog-qa` directory.
    pub fn config_dir(&self) -> PathBuf {
        self.workspace.join(CONFIG_DIR)
    }

    /// Path to the prompt override directory.
    pub fn prompts_dir(&self) -> PathBuf {
        self.config_dir().join("prompts")
    }

    /// Get a provider entry from the config file, if present.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: `CATALOG_QA_API_KEY`, the provider's `apiKeyEnv`, then
    /// `OPENAI_API_KEY` for the `openai` provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(api_key_env) {
                return Some(key);
            }
        }

        if provider == "openai" {
            return std::env::var(OPENAI_API_KEY_ENV).ok();
        }

        None
    }

    /// Resolve the OpenAI organization header, if configured.
    pub fn resolve_organization(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI {
                organization_env: Some(env),
                ..
            }) => std::env::var(env).ok(),
            _ => None,
        }
    }

    /// Endpoint override for a provider.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint())
            .map(str::to_string)
    }

    /// Request timeout override for a provider, in seconds.
    pub fn resolve_timeout(&self, provider: &str) -> Option<u64> {
        match self.get_provider_config(provider) {
            Some(ProviderConfig::Ollama { timeout, .. }) => *timeout,
            _ => None,
        }
    }

    /// Validate configuration before any network call is made.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        for provider in [&self.provider, &self.embedding_provider] {
            if provider == "openai" && self.resolve_api_key(provider).is_none() {
                return Err(AppError::Config(format!(
                    "API key not found for provider '{}'. Set {} or CATALOG_QA_API_KEY",
                    provider, OPENAI_API_KEY_ENV
                )));
            }
        }

        self.retrieval.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> AppConfig {
        AppConfig {
            provider: "ollama".to_string(),
            embedding_provider: "trigram".to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.embedding_model, "text-embedding-ada-002");
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.retrieval.chain_type, "stuff");
        assert_eq!(config.retrieval.temperature, 0.0);
        assert!(!config.verbose);
    }

    #[test]
    fn test_config_dir() {
        let config = AppConfig::default();
        assert!(config.config_dir().ends_with(".catalog-qa"));
        assert!(config.prompts_dir().ends_with(".catalog-qa/prompts"));
    }

    #[test]
    fn test_with_overrides() {
        let overridden = AppConfig::default().with_overrides(ConfigOverrides {
            provider: Some("ollama".to_string()),
            model: Some("llama3.2".to_string()),
            embedding_provider: Some("trigram".to_string()),
            verbose: true,
            ..ConfigOverrides::default()
        });

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert_eq!(overridden.embedding_provider, "trigram");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_selects_active_providers() {
        let yaml = r#"
llm:
  activeProvider: ollama
  activeEmbeddingProvider: ollama
  providers:
    ollama:
      endpoint: http://gpu-box:11434
      model: mistral
      embeddingModel: nomic-embed-text
      timeout: 90
retrieval:
  topK: 6
  chainType: map_reduce
logging:
  color: false
  json: true
"#;
        let merged = AppConfig::default().merge_yaml_str(yaml).unwrap();

        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.model, "mistral");
        assert_eq!(merged.embedding_provider, "ollama");
        assert_eq!(merged.embedding_model, "nomic-embed-text");
        assert_eq!(merged.retrieval.top_k, 6);
        assert_eq!(merged.retrieval.chain_type, "map_reduce");
        assert_eq!(merged.retrieval.search_type, "similarity");
        assert!(merged.no_color);
        assert!(merged.log_json);
        assert_eq!(
            merged.resolve_endpoint("ollama"),
            Some("http://gpu-box:11434".to_string())
        );
        assert_eq!(merged.resolve_timeout("ollama"), Some(90));
    }

    #[test]
    fn test_merge_yaml_openai_entry() {
        let yaml = r#"
llm:
  activeProvider: openai
  providers:
    openai:
      apiKeyEnv: MY_TEAM_OPENAI_KEY
      model: gpt-4o-mini
      embeddingModel: text-embedding-3-small
"#;
        let merged = AppConfig::default().merge_yaml_str(yaml).unwrap();
        assert_eq!(merged.model, "gpt-4o-mini");
        assert_eq!(merged.embedding_provider, "openai");
        assert!(matches!(
            merged.get_provider_config("openai"),
            Some(ProviderConfig::OpenAI { .. })
        ));
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-explicit".to_string());
        assert_eq!(
            config.resolve_api_key("openai"),
            Some("sk-explicit".to_string())
        );
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = offline_config();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_embedding_provider() {
        let mut config = offline_config();
        config.embedding_provider = "word2vec".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_validate_offline_providers() {
        assert!(offline_config().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = offline_config();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_lambda_mult_range() {
        for lambda_mult in [-0.1, 1.5, f32::NAN] {
            let mut config = offline_config();
            config.retrieval.lambda_mult = lambda_mult;
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("lambdaMult"));
        }

        let mut config = offline_config();
        config.retrieval.lambda_mult = 1.0;
        assert!(config.validate().is_ok());
        config.retrieval.lambda_mult = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_switching_provider_brings_its_models() {
        let config = AppConfig::default().with_overrides(ConfigOverrides {
            provider: Some("ollama".to_string()),
            embedding_provider: Some("ollama".to_string()),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.embedding_model, "nomic-embed-text");
    }

    #[test]
    fn test_switching_provider_prefers_config_entry() {
        let yaml = r#"
llm:
  activeProvider: openai
  providers:
    ollama:
      endpoint: http://localhost:11434
      model: mistral
      embeddingModel: mxbai-embed-large
"#;
        let config = AppConfig::default()
            .merge_yaml_str(yaml)
            .unwrap()
            .with_overrides(ConfigOverrides {
                provider: Some("ollama".to_string()),
                embedding_provider: Some("ollama".to_string()),
                ..ConfigOverrides::default()
            });

        assert_eq!(config.model, "mistral");
        assert_eq!(config.embedding_model, "mxbai-embed-large");
    }

    #[test]
    fn test_explicit_model_beats_provider_default() {
        let config = AppConfig::default().with_overrides(ConfigOverrides {
            embedding_provider: Some("ollama".to_string()),
            embedding_model: Some("all-minilm".to_string()),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.embedding_model, "all-minilm");
    }

    #[test]
    fn test_same_provider_keeps_model() {
        let mut config = offline_config();
        config.model = "qwen2.5".to_string();
        let config = config.with_overrides(ConfigOverrides {
            provider: Some("ollama".to_string()),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.model, "qwen2.5");
    }

    #[test]
    fn test_validate_openai_with_explicit_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reload_missing_explicit_config_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            config_file: Some(temp.path().join("nope.yaml")),
            ..AppConfig::default()
        };
        assert!(config.reload().is_err());
    }
}
