use async_trait::async_trait;
use scry_engine::backend::Backend;
use scry_engine::config::{GetByAiOptions, ScryConfig};
use scry_engine::oracle::{OracleError, OracleRequest, SelectorOracle};
use scry_engine::resolution::{HandleSource, ResolutionEngine};
use scry_common::history::SelectorAnswer;
use scry_h::HeadlessBackend;
use serial_test::serial;

const LOGIN_PAGE: &str = "<html><head><title>Login</title></head><body>\
<form><input id='username'><input id='password' type='password'>\
<button id='login-btn' type='button' onclick=\"document.body.insertAdjacentHTML('beforeend','<p>Welcome</p>')\">Login</button>\
</form><script>var ignored = 1;</script></body></html>";

struct FixedOracle(&'static str);

#[async_trait]
impl SelectorOracle for FixedOracle {
    async fn infer(&self, _request: &OracleRequest) -> Result<SelectorAnswer, OracleError> {
        Ok(SelectorAnswer::new(self.0))
    }
}

async fn launch() -> Option<HeadlessBackend> {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init()
        .ok();

    let mut backend = HeadlessBackend::new();
    match backend.launch().await {
        Ok(_) => Some(backend),
        Err(e) => {
            eprintln!("Failed to launch browser (is Chromium installed?): {}", e);
            None
        }
    }
}

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", html.replace('#', "%23"))
}

#[tokio::test]
#[serial]
async fn test_headless_page_primitives() {
    let Some(mut backend) = launch().await else {
        return;
    };

    let nav = backend
        .navigate(&data_url(LOGIN_PAGE))
        .await
        .expect("Navigation failed");
    assert_eq!(nav.title, "Login");
    assert!(backend.current_url().await.unwrap().starts_with("data:text/html"));

    let html = backend.body_html().await.unwrap();
    assert!(html.starts_with("<body"));
    assert!(html.contains("login-btn"));

    assert!(backend.query_selector("#username").await.unwrap());
    assert!(!backend.query_selector("#missing").await.unwrap());
    assert!(!backend.query_selector("##").await.unwrap());

    backend.type_text("#username", "admin").await.unwrap();
    backend.click("#login-btn").await.unwrap();
    assert!(backend.page_text().await.unwrap().contains("Welcome"));

    backend.close().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_headless_resolution_records_history() {
    let Some(mut backend) = launch().await else {
        return;
    };
    backend.navigate(&data_url(LOGIN_PAGE)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("selector.md");
    std::fs::write(
        &template,
        "DOM: {{REPLACE_ME_DOM}}\nFind: {{REPLACE_ME_ELEMENT_DESCRIPTION}}",
    )
    .unwrap();

    let mut config = ScryConfig::default();
    config.history.path = dir.path().join("history.json");
    config.prompt.template_path = template;
    config.artifacts.enabled = false;

    let engine = ResolutionEngine::new(config, Box::new(FixedOracle("#login-btn")));
    let options = GetByAiOptions::default();

    let handle = engine
        .get_by_ai(&mut backend, "Login button", &options)
        .await
        .unwrap();
    assert_eq!(handle.selector, "#login-btn");
    assert_eq!(handle.source, HandleSource::Oracle);

    let history = engine.store().load_history().await;
    assert_eq!(history.len(), 1);
    let record = &history.records()[0];
    assert!(record.found);
    assert!(!record.page_snapshot.contains("ignored"));

    let again = engine
        .get_by_ai(&mut backend, "Login button", &options)
        .await
        .unwrap();
    assert_eq!(again.source, HandleSource::History);

    backend.close().await.unwrap();
}
