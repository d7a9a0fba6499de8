use scry_common::prompt::PromptTemplate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
#[error("Failed to read prompt template {path}: {source}")]
pub struct TemplateError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Read the prompt template at `path`.
///
/// A missing template is a configuration error; there is no built-in fallback.
pub async fn load_template(path: &Path) -> Result<PromptTemplate, TemplateError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TemplateError {
            path: path.to_path_buf(),
            source,
        })?;

    let template = PromptTemplate::new(text);
    let missing = template.missing_tokens();
    if !missing.is_empty() {
        warn!(
            "Prompt template {} has no {} placeholder",
            path.display(),
            missing.join(" or ")
        );
    }
    Ok(template)
}

/// Render the prompt for `description` against the sanitized `dom`.
pub async fn build_prompt(
    template_path: &Path,
    description: &str,
    dom: &str,
) -> Result<String, TemplateError> {
    Ok(load_template(template_path).await?.render(description, dom))
}
