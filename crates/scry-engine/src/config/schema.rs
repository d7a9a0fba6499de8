use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "deepseek-coder-v2:latest";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScryConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub defaults: GetByAiOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_history_path() -> PathBuf {
    PathBuf::from("history.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
        }
    }
}

fn default_template_path() -> PathBuf {
    PathBuf::from("prompts/selector.md")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_artifacts_enabled")]
    pub enabled: bool,
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            enabled: default_artifacts_enabled(),
            dir: default_artifacts_dir(),
        }
    }
}

fn default_artifacts_enabled() -> bool {
    true
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from(".scry")
}

/// Per-call options for `get_by_ai`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetByAiOptions {
    /// Manual fallback selector. Reserved; not consulted by resolution.
    #[serde(default)]
    pub backup_selector: Option<String>,
    /// Trace resolution steps at info level instead of debug.
    #[serde(default)]
    pub log: bool,
    /// Inference model; the oracle's configured model when unset.
    #[serde(default)]
    pub model: Option<String>,
    /// Retry hint for callers. Reserved; resolution never retries.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// Oracle request deadline in milliseconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default = "default_use_history")]
    pub use_history: bool,
}

impl Default for GetByAiOptions {
    fn default() -> Self {
        Self {
            backup_selector: None,
            log: false,
            model: None,
            retry_count: default_retry_count(),
            timeout: None,
            use_history: default_use_history(),
        }
    }
}

impl GetByAiOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn without_history(mut self) -> Self {
        self.use_history = false;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.log = true;
        self
    }

    pub fn with_timeout_ms(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn default_retry_count() -> u32 {
    1
}

fn default_use_history() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScryConfig::default();
        assert_eq!(config.history.path, PathBuf::from("history.json"));
        assert_eq!(config.oracle.endpoint, "http://localhost:11434");
        assert_eq!(config.oracle.model, DEFAULT_MODEL);
        assert_eq!(config.defaults.model, None);
        assert_eq!(config.defaults.retry_count, 1);
        assert!(config.defaults.use_history);
        assert!(!config.defaults.log);
        assert!(config.artifacts.enabled);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
oracle:
  model: "llama3:8b"
defaults:
  use_history: false
  timeout: 5000
"#;
        let config: ScryConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.oracle.model, "llama3:8b");
        assert_eq!(config.oracle.endpoint, DEFAULT_ENDPOINT);
        assert!(!config.defaults.use_history);
        assert_eq!(config.defaults.timeout, Some(5000));
        assert_eq!(config.defaults.retry_count, 1);
        assert_eq!(config.defaults.model, None);
    }
}
