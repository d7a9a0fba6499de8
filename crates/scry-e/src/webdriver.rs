use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

const READY_ATTEMPTS: u32 = 30;
const READY_INTERVAL: Duration = Duration::from_millis(200);

pub type WebDriverResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct WebDriverClient {
    pub client: Client,
}

impl WebDriverClient {
    pub async fn connect(
        url: &str,
        capabilities: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> WebDriverResult<Self> {
        let caps = capabilities.unwrap_or_default();
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(url)
            .await
            .map_err(|e| format!("Failed to connect to WebDriver at {}: {}", url, e))?;

        Ok(Self { client })
    }

    pub async fn close(self) -> WebDriverResult<()> {
        self.client
            .close()
            .await
            .map_err(|e| format!("Failed to close session: {}", e))?;
        Ok(())
    }
}

/// Poll `<url>/status` until the driver answers with a success code.
pub async fn wait_until_ready(url: &str) -> Result<(), String> {
    wait_until_ready_with(url, READY_ATTEMPTS, READY_INTERVAL).await
}

pub async fn wait_until_ready_with(
    url: &str,
    attempts: u32,
    interval: Duration,
) -> Result<(), String> {
    let status_url = format!("{}/status", url.trim_end_matches('/'));
    let client = reqwest::Client::new();

    for attempt in 1..=attempts {
        match client.get(&status_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("WebDriver ready after {} attempt(s)", attempt);
                return Ok(());
            }
            Ok(resp) => {
                warn!(
                    "WebDriver responded {} but is not ready yet (attempt {})",
                    resp.status(),
                    attempt
                );
            }
            Err(_) => {
                if attempt % 5 == 0 {
                    info!("Waiting for WebDriver at {}... (attempt {})", url, attempt);
                }
            }
        }
        sleep(interval).await;
    }

    Err(format!(
        "WebDriver at {} did not become ready after {} attempts",
        url, attempts
    ))
}
