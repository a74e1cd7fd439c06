//! Provider identifiers and their defaults.

/// Default OpenAI API base URL.
pub const OPENAI_DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Default Ollama base URL.
pub const OLLAMA_DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Chat provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAI,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }

    /// Base URL used when the config names none.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAI => OPENAI_DEFAULT_ENDPOINT,
            Self::Ollama => OLLAMA_DEFAULT_ENDPOINT,
        }
    }

    /// Request timeout used when the config names none.
    pub fn default_timeout_secs(&self) -> u64 {
        match self {
            Self::OpenAI => 60,
            // Local models can take a while to load on first use.
            Self::Ollama => 120,
        }
    }

    /// Whether the provider refuses requests without an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("openai"), Some(ProviderType::OpenAI));
        assert_eq!(ProviderType::parse("OpenAI"), Some(ProviderType::OpenAI));
        assert_eq!(ProviderType::parse("ollama"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("claude"), None);
    }

    #[test]
    fn test_only_openai_requires_key() {
        assert!(ProviderType::OpenAI.requires_api_key());
        assert!(!ProviderType::Ollama.requires_api_key());
    }
}
