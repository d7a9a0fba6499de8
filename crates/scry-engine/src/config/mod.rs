pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{
    ArtifactsConfig, GetByAiOptions, HistoryConfig, OracleConfig, PromptConfig, ScryConfig,
};
