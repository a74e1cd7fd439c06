//! Prompt builder: renders a template's system and user parts.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptTemplate};
use catalog_qa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a template and input variables.
///
/// Every variable listed in `input_variables` must be present in
/// `variables`; extra variables are allowed and ignored by the template.
///
/// # Example
/// ```no_run
/// use catalog_qa_prompt::{build_prompt, load_prompt};
/// use std::collections::HashMap;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let template = load_prompt(Path::new("."), "qa.stuff")?;
/// let mut vars = HashMap::new();
/// vars.insert("context".to_string(), "name: Sun Shield Shirt".to_string());
/// vars.insert("question".to_string(), "Which shirts block UV?".to_string());
///
/// let built = build_prompt(&template, &vars)?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    template: &PromptTemplate,
    variables: &HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", template.id);

    let missing: Vec<&str> = template
        .input_variables
        .iter()
        .filter(|name| !variables.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' is missing variables: {}",
            template.id,
            missing.join(", ")
        )));
    }

    let system = template
        .system
        .as_deref()
        .map(|source| render_template(source, variables))
        .transpose()?;
    let user = render_template(&template.template, variables)?;

    let mut resolved_variables: Vec<String> = variables.keys().cloned().collect();
    resolved_variables.sort();

    let rendered_chars =
        user.chars().count() + system.as_deref().map(|s| s.chars().count()).unwrap_or(0);

    Ok(BuiltPrompt {
        system,
        user,
        metadata: BuiltPromptMetadata {
            source_prompt_id: template.id.clone(),
            resolved_variables,
            rendered_chars,
        },
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Catalog rows contain quotes and ampersands; never HTML-escape them.
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{builtin, QA_DIRECT, QA_STUFF};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let rendered = render_template("Question: {{prompt}}", &vars(&[("prompt", "Hello")]));
        assert_eq!(rendered.unwrap(), "Question: Hello");
    }

    #[test]
    fn test_no_html_escaping() {
        let rendered = render_template("{{x}}", &vars(&[("x", "Men's \"Tech\" Tee & Shorts <XL>")]));
        assert_eq!(rendered.unwrap(), "Men's \"Tech\" Tee & Shorts <XL>");
    }

    #[test]
    fn test_build_stuff_prompt() {
        let template = builtin(QA_STUFF).unwrap();
        let built = build_prompt(
            &template,
            &vars(&[
                ("context", "name: Sun Shield Shirt"),
                ("question", "Which shirts block UV?"),
            ]),
        )
        .unwrap();

        let system = built.system.unwrap();
        assert!(system.starts_with("Use the following pieces of context"));
        assert!(system.ends_with("name: Sun Shield Shirt"));
        assert_eq!(built.user, "Which shirts block UV?");
        assert_eq!(built.metadata.source_prompt_id, "qa.stuff");
        assert_eq!(built.metadata.resolved_variables, vec!["context", "question"]);
    }

    #[test]
    fn test_build_direct_prompt() {
        let template = builtin(QA_DIRECT).unwrap();
        let built = build_prompt(
            &template,
            &vars(&[("context", "row one"), ("question", "List shirts")]),
        )
        .unwrap();

        assert!(built.system.is_none());
        assert_eq!(built.user, "row one Question: List shirts");
        assert_eq!(built.metadata.rendered_chars, built.user.chars().count());
    }

    #[test]
    fn test_missing_variable_is_error() {
        let template = builtin(QA_STUFF).unwrap();
        let err = build_prompt(&template, &vars(&[("question", "q")])).unwrap_err();
        assert!(err.to_string().contains("context"));
    }

    #[test]
    fn test_malformed_template_is_error() {
        let template = PromptTemplate::new("bad", "Bad", None, "{{#if}}", &[]);
        assert!(build_prompt(&template, &HashMap::new()).is_err());
    }
}
