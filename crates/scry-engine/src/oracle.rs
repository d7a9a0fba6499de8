//! Selector oracle: the language model asked to infer a selector.

use crate::config::OracleConfig;
use async_trait::async_trait;
use scry_common::history::SelectorAnswer;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Oracle response body is not a generate response: {0}")]
    MalformedBody(String),

    #[error("Oracle answer '{payload}' is not a selector object: {reason}")]
    MalformedAnswer { payload: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub prompt: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

/// Infers a selector from a rendered prompt. Implementations do not retry.
#[async_trait]
pub trait SelectorOracle: Send + Sync {
    async fn infer(&self, request: &OracleRequest) -> Result<SelectorAnswer, OracleError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'static str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for an Ollama-style `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &OracleConfig) -> Self {
        Self::new(config.endpoint.clone())
    }

    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl SelectorOracle for OllamaClient {
    async fn infer(&self, request: &OracleRequest) -> Result<SelectorAnswer, OracleError> {
        let body = GenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            format: "json",
            stream: false,
        };

        let mut builder = self.client.post(self.generate_url()).json(&body);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!("Asking {} for a selector", request.model);
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_generate_body(&text)
    }
}

/// Decode a generate response whose `response` field holds the answer as a
/// JSON-encoded string.
pub fn parse_generate_body(body: &str) -> Result<SelectorAnswer, OracleError> {
    let envelope: GenerateResponse =
        serde_json::from_str(body).map_err(|e| OracleError::MalformedBody(e.to_string()))?;

    serde_json::from_str(&envelope.response).map_err(|e| OracleError::MalformedAnswer {
        payload: envelope.response.clone(),
        reason: e.to_string(),
    })
}
