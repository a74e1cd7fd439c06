//! Prompt loader: workspace overrides first, then built-ins.

use crate::builtin::{builtin, BUILTIN_IDS};
use crate::types::PromptTemplate;
use catalog_qa_core::config::CONFIG_DIR;
use catalog_qa_core::{AppError, AppResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Directory holding prompt overrides for a workspace.
pub fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(CONFIG_DIR).join("prompts")
}

/// Load a prompt template by ID.
///
/// Looks for `.catalog-qa/prompts/<id>.yml` (or `.yaml`) in the workspace
/// and falls back to the built-in template with the same id.
///
/// # Example
/// ```no_run
/// use catalog_qa_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "qa.stuff")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptTemplate> {
    if let Some(prompt_file) = find_override(workspace_path, prompt_id) {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let template: PromptTemplate = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to parse prompt YAML {:?}: {}",
                prompt_file, e
            ))
        })?;

        validate_prompt(&template, prompt_id)?;

        tracing::info!("Loaded prompt override: {} ({})", template.id, template.title);
        return Ok(template);
    }

    builtin(prompt_id).ok_or_else(|| {
        AppError::Prompt(format!(
            "Prompt '{}' not found. Built-in prompts: {}",
            prompt_id,
            BUILTIN_IDS.join(", ")
        ))
    })
}

fn find_override(workspace_path: &Path, prompt_id: &str) -> Option<PathBuf> {
    let dir = prompts_dir(workspace_path);
    ["yml", "yaml"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", prompt_id, ext)))
        .find(|path| path.is_file())
}

/// List every available prompt id: built-ins plus workspace overrides.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids: BTreeSet<String> = BUILTIN_IDS.iter().map(|id| id.to_string()).collect();

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let is_yaml = matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yml") | Some("yaml")
            );
            if path.is_file() && is_yaml {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    prompt_ids.insert(stem.to_string());
                }
            }
        }
    }

    Ok(prompt_ids.into_iter().collect())
}

fn validate_prompt(template: &PromptTemplate, expected_id: &str) -> AppResult<()> {
    if template.id != expected_id {
        return Err(AppError::Prompt(format!(
            "Prompt file for '{}' declares id '{}'",
            expected_id, template.id
        )));
    }

    if template.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if template.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_override(dir: &Path, id: &str, body: &str) -> PathBuf {
        let prompts = prompts_dir(dir);
        fs::create_dir_all(&prompts).unwrap();
        let file_path = prompts.join(format!("{}.yml", id));
        fs::write(&file_path, body).unwrap();
        file_path
    }

    #[test]
    fn test_builtin_when_no_override() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(temp_dir.path(), "qa.stuff").unwrap();
        assert_eq!(prompt.id, "qa.stuff");
        assert!(prompt.system.unwrap().contains("{{context}}"));
    }

    #[test]
    fn test_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            "qa.stuff",
            "id: qa.stuff\ntitle: Shop voice\ntemplate: \"{{context}}\\n\\nCustomer asks: {{question}}\"\ninputVariables: [context, question]\n",
        );

        let prompt = load_prompt(temp_dir.path(), "qa.stuff").unwrap();
        assert_eq!(prompt.title, "Shop voice");
        assert!(prompt.system.is_none());
        assert!(prompt.template.contains("Customer asks"));
    }

    #[test]
    fn test_override_with_mismatched_id() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            "qa.stuff",
            "id: something.else\ntitle: T\ntemplate: \"x\"\n",
        );
        assert!(load_prompt(temp_dir.path(), "qa.stuff").is_err());
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_prompt(temp_dir.path(), "nonexistent").unwrap_err();
        assert!(err.to_string().contains("qa.stuff"));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), "broken", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "broken").is_err());
    }

    #[test]
    fn test_list_prompts_merges_overrides() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), "shop.tone", "id: shop.tone\ntitle: T\ntemplate: x\n");
        write_override(temp_dir.path(), "qa.stuff", "id: qa.stuff\ntitle: T\ntemplate: x\n");

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts.len(), BUILTIN_IDS.len() + 1);
        assert!(prompts.contains(&"shop.tone".to_string()));

        let mut sorted = prompts.clone();
        sorted.sort();
        assert_eq!(prompts, sorted);
    }
}
