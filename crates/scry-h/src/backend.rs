use crate::cdp::CdpClient;
use async_trait::async_trait;
use chromiumoxide::Page;
use scry_engine::backend::{Backend, BackendError, NavigationResult};
use serde_json::Value;
use tracing::info;

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    visible: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::new_with_visibility(false)
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self {
            client: None,
            visible,
        }
    }

    pub fn get_client(&self) -> Option<&CdpClient> {
        self.client.as_ref()
    }

    fn page(&self) -> Result<&Page, BackendError> {
        self.client
            .as_ref()
            .map(|c| &c.page)
            .ok_or(BackendError::NotReady)
    }

    async fn evaluate(&self, script: String) -> Result<Value, BackendError> {
        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| BackendError::Script(e.to_string()))?
            .into_value::<Value>()
            .map_err(BackendError::from)
    }

    async fn navigation_result(page: &Page) -> Result<NavigationResult, BackendError> {
        let title = page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult {
            url,
            title,
            status: 200,
        })
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// JS string literal for `selector`.
fn js_string(selector: &str) -> String {
    Value::String(selector.to_string()).to_string()
}

fn as_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching Headless Backend (Chromium)...");
        let client = CdpClient::launch(self.visible)
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
        let page = self.page()?;
        info!("Navigating to: {}", url);
        page.goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;
        Self::navigation_result(page).await
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        self.page()?
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))
            .map(Option::unwrap_or_default)
    }

    async fn body_html(&mut self) -> Result<String, BackendError> {
        let value = self
            .evaluate("document.body ? document.body.outerHTML : ''".into())
            .await?;
        Ok(as_string(value))
    }

    async fn query_selector(&mut self, selector: &str) -> Result<bool, BackendError> {
        // Bad selector syntax throws; report it as no match.
        let script = format!(
            "(() => {{ try {{ return document.querySelector({}) !== null; }} catch (e) {{ return false; }} }})()",
            js_string(selector)
        );
        match self.evaluate(script).await? {
            Value::Bool(found) => Ok(found),
            other => Err(BackendError::Script(format!(
                "querySelector returned {}",
                other
            ))),
        }
    }

    async fn click(&mut self, selector: &str) -> Result<(), BackendError> {
        let element = self
            .page()?
            .find_element(selector)
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
            .page()?
            .find_element(selector)
            .await
            .map_err(|_| BackendError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        element
            .click()
            .await
            .map_err(|e| BackendError::Script(format!("focus failed: {}", e)))?
            .type_str(text)
            .await
            .map_err(|e| BackendError::Script(format!("typing failed: {}", e)))?;
        Ok(())
    }

    async fn page_text(&mut self) -> Result<String, BackendError> {
        let value = self
            .evaluate("document.body ? document.body.innerText : ''".into())
            .await?;
        Ok(as_string(value))
    }
}
