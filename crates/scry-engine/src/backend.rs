use async_trait::async_trait;
pub use scry_common::error::BackendError;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
    pub status: u16,
}

/// Browser driver the resolution engine runs against.
///
/// Implemented by the headless (CDP) and embedded (WebDriver) backends. Calls
/// are issued strictly one after another; no backend is expected to handle
/// concurrent commands.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, connect to driver, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// URL of the page currently loaded.
    async fn current_url(&mut self) -> Result<String, BackendError>;

    /// `outerHTML` of the document body.
    async fn body_html(&mut self) -> Result<String, BackendError>;

    /// Whether the first element matching `selector` exists.
    ///
    /// Invalid selector syntax may surface either as `Ok(false)` or as an error.
    async fn query_selector(&mut self, selector: &str) -> Result<bool, BackendError>;

    /// Click the first element matching `selector`.
    async fn click(&mut self, _selector: &str) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("click".into()))
    }

    /// Type `text` into the first element matching `selector`.
    async fn type_text(&mut self, _selector: &str, _text: &str) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("type_text".into()))
    }

    /// Rendered text of the document body.
    async fn page_text(&mut self) -> Result<String, BackendError> {
        Err(BackendError::NotSupported("page_text".into()))
    }
}
