use thiserror::Error;

/// Errors raised by browser backends.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend not ready")]
    NotReady,

    #[error("Operation not supported by this backend: {0}")]
    NotSupported(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("No element matches selector '{selector}'")]
    ElementNotFound { selector: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Other(String),
}

impl BackendError {
    /// True when the error means the page itself could not be reached, as
    /// opposed to a single query failing.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BackendError::NotReady | BackendError::Navigation(_) | BackendError::Io(_)
        )
    }
}
