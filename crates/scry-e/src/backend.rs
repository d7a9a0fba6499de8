use crate::webdriver::{self, WebDriverClient};
use async_trait::async_trait;
use fantoccini::Locator;
use scry_engine::backend::{Backend, BackendError, NavigationResult};
use serde_json::Value;
use tracing::info;

pub struct EmbeddedBackend {
    client: Option<WebDriverClient>,
    webdriver_url: String,
}

impl EmbeddedBackend {
    /// Backend for a driver listening on the default local port.
    pub fn new() -> Self {
        Self::with_url(webdriver::DEFAULT_WEBDRIVER_URL.to_string())
    }

    pub fn with_url(webdriver_url: String) -> Self {
        Self {
            client: None,
            webdriver_url,
        }
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    fn client(&self) -> Result<&WebDriverClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, BackendError> {
        self.client()?
            .client
            .execute(script, args)
            .await
            .map_err(|e| BackendError::Script(e.to_string()))
    }

    async fn navigation_result(client: &WebDriverClient) -> NavigationResult {
        let title = client.client.title().await.unwrap_or_default();
        let url = client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();
        NavigationResult {
            url,
            title,
            status: 200,
        }
    }
}

impl Default for EmbeddedBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn as_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Backend for EmbeddedBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Connecting to external WebDriver at {}...", self.webdriver_url);
        webdriver::wait_until_ready(&self.webdriver_url)
            .await
            .map_err(BackendError::Other)?;
        let client = WebDriverClient::connect(&self.webdriver_url, None)
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;
        info!("Navigating to: {}", url);
        client
            .client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;
        Ok(Self::navigation_result(client).await)
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        self.client()?
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| BackendError::Navigation(e.to_string()))
    }

    async fn body_html(&mut self) -> Result<String, BackendError> {
        let value = self
            .execute("return document.body ? document.body.outerHTML : '';", vec![])
            .await?;
        Ok(as_string(value))
    }

    async fn query_selector(&mut self, selector: &str) -> Result<bool, BackendError> {
        let value = self
            .execute(
                "try { return document.querySelector(arguments[0]) !== null; } catch (e) { return false; }",
                vec![Value::String(selector.to_string())],
            )
            .await?;
        value
            .as_bool()
            .ok_or_else(|| BackendError::Script(format!("querySelector returned {}", value)))
    }

    async fn click(&mut self, selector: &str) -> Result<(), BackendError> {
        let element = self
            .client()?
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|_| BackendError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        element
            .click()
            .await
            .map_err(|e| BackendError::Script(format!("click failed: {}", e)))?;
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), BackendError> {
        let element = self
            .client()?
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|_| BackendError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        element
            .send_keys(text)
            .await
            .map_err(|e| BackendError::Script(format!("typing failed: {}", e)))
    }

    async fn page_text(&mut self) -> Result<String, BackendError> {
        let value = self
            .execute("return document.body ? document.body.innerText : '';", vec![])
            .await?;
        Ok(as_string(value))
    }
}
