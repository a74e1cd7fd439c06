//! Prompt template types.

use serde::{Deserialize, Serialize};

/// A prompt template, either built in or loaded from YAML.
///
/// Both `system` and `template` are Handlebars sources. The rendered
/// `template` becomes the user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Unique template identifier (e.g., "qa.stuff")
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// System message template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message template
    pub template: String,

    /// Variables that must be supplied when rendering
    #[serde(rename = "inputVariables", default)]
    pub input_variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        system: Option<&str>,
        template: impl Into<String>,
        input_variables: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            system: system.map(str::to_string),
            template: template.into(),
            input_variables: input_variables.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// A fully rendered prompt ready for the chat model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source template ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Names of the variables that were supplied, sorted
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: Vec<String>,

    /// Rendered size in characters (system + user)
    #[serde(rename = "renderedChars")]
    pub rendered_chars: usize,
}
