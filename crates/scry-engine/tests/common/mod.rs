#![allow(dead_code)]

use async_trait::async_trait;
use scry_common::history::SelectorAnswer;
use scry_engine::backend::{Backend, BackendError, NavigationResult};
use scry_engine::config::ScryConfig;
use scry_engine::oracle::{OracleError, OracleRequest, SelectorOracle};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const TEMPLATE: &str = "Page:\n{{REPLACE_ME_DOM}}\nReturn {\"selector\": ...} for: {{REPLACE_ME_ELEMENT_DESCRIPTION}}";

pub const LOGIN_PAGE: &str = r#"<body>
  <script>alert(1)</script>
  <form>
    <input id="username" name="username">
    <input id="password" type="password">
    <button id="login-btn">Login</button>
  </form>
</body>"#;

/// In-memory page. Selectors "match" when listed in `present`.
#[derive(Debug, Default)]
pub struct MockBackend {
    pub url: String,
    pub html: String,
    pub text: String,
    pub present: HashSet<String>,
    pub invalid: HashSet<String>,
    pub queries: Vec<String>,
    pub clicked: Vec<String>,
    pub typed: Vec<(String, String)>,
}

impl MockBackend {
    pub fn login_page(present: &[&str]) -> Self {
        Self {
            url: "http://localhost/app/index.html".into(),
            html: LOGIN_PAGE.into(),
            text: "Login".into(),
            present: present.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
    async fn close(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
    async fn is_ready(&self) -> bool {
        true
    }
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.url = url.to_string();
        Ok(NavigationResult {
            url: url.to_string(),
            title: "Mock".into(),
            status: 200,
        })
    }
    async fn current_url(&mut self) -> Result<String, BackendError> {
        Ok(self.url.clone())
    }
    async fn body_html(&mut self) -> Result<String, BackendError> {
        Ok(self.html.clone())
    }
    async fn query_selector(&mut self, selector: &str) -> Result<bool, BackendError> {
        self.queries.push(selector.to_string());
        if self.invalid.contains(selector) {
            return Err(BackendError::Script(format!(
                "'{}' is not a valid selector",
                selector
            )));
        }
        Ok(self.present.contains(selector))
    }
    async fn click(&mut self, selector: &str) -> Result<(), BackendError> {
        if !self.present.contains(selector) {
            return Err(BackendError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        self.clicked.push(selector.to_string());
        Ok(())
    }
    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), BackendError> {
        self.typed.push((selector.to_string(), text.to_string()));
        Ok(())
    }
    async fn page_text(&mut self) -> Result<String, BackendError> {
        Ok(self.text.clone())
    }
}

/// Oracle answering from a queue and remembering every request.
#[derive(Clone, Default)]
pub struct MockOracle {
    answers: Arc<Mutex<VecDeque<Result<String, String>>>>,
    pub requests: Arc<Mutex<Vec<OracleRequest>>>,
}

impl MockOracle {
    pub fn answering(selectors: &[&str]) -> Self {
        let oracle = Self::default();
        for s in selectors {
            oracle.push_answer(s);
        }
        oracle
    }

    pub fn push_answer(&self, selector: &str) {
        self.answers
            .lock()
            .unwrap()
            .push_back(Ok(selector.to_string()));
    }

    pub fn push_failure(&self, body: &str) {
        self.answers
            .lock()
            .unwrap()
            .push_back(Err(body.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> OracleRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl SelectorOracle for MockOracle {
    async fn infer(&self, request: &OracleRequest) -> Result<SelectorAnswer, OracleError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.answers.lock().unwrap().pop_front() {
            Some(Ok(selector)) => Ok(SelectorAnswer::new(selector)),
            Some(Err(body)) => Err(OracleError::MalformedBody(body)),
            None => panic!("MockOracle ran out of answers"),
        }
    }
}

/// Config rooted in `dir` with a valid template written to disk.
pub fn test_config(dir: &Path) -> ScryConfig {
    std::fs::write(dir.join("prompt.md"), TEMPLATE).unwrap();
    let mut config = ScryConfig::default();
    config.history.path = dir.join("history.json");
    config.prompt.template_path = dir.join("prompt.md");
    config.artifacts.dir = dir.join("artifacts");
    config
}
