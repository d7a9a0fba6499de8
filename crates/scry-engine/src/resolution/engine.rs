//! Resolution engine: description in, verified selector out.
//!
//! A call walks `start -> history_lookup -> validate_cached | infer ->
//! validate_inferred -> record -> success | fail`. History is consulted
//! first; a cached selector that still matches is returned without touching
//! the history file. Anything else goes to the oracle, and the oracle's answer
//! is recorded whether or not it matched.

use super::result::{ElementHandle, HandleSource, ResolutionError, Stage};
use crate::artifacts::ArtifactWriter;
use crate::backend::Backend;
use crate::config::{GetByAiOptions, ScryConfig};
use crate::history::HistoryStore;
use crate::oracle::{OracleRequest, SelectorOracle};
use crate::prompt::build_prompt;
use crate::validator::SelectorValidator;
use scry_common::history::HistoryRecord;
use scry_common::sanitize::sanitize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::warn;

macro_rules! step {
    ($verbose:expr, $stage:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!(stage = %$stage, $($arg)+)
        } else {
            tracing::debug!(stage = %$stage, $($arg)+)
        }
    };
}

pub struct ResolutionEngine {
    config: ScryConfig,
    store: HistoryStore,
    oracle: Box<dyn SelectorOracle>,
    artifacts: Option<ArtifactWriter>,
    last_timestamp: AtomicU64,
}

impl ResolutionEngine {
    pub fn new(config: ScryConfig, oracle: Box<dyn SelectorOracle>) -> Self {
        let store = HistoryStore::new(config.history.path.clone());
        let artifacts = config
            .artifacts
            .enabled
            .then(|| ArtifactWriter::new(config.artifacts.dir.clone()));
        Self {
            config,
            store,
            oracle,
            artifacts,
            last_timestamp: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ScryConfig {
        &self.config
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn default_options(&self) -> &GetByAiOptions {
        &self.config.defaults
    }

    /// Resolve `description` on the backend's current page.
    pub async fn get_by_ai<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        description: &str,
        options: &GetByAiOptions,
    ) -> Result<ElementHandle, ResolutionError> {
        let verbose = options.log;
        let page_url = backend.current_url().await?;
        step!(
            verbose,
            Stage::Start,
            "Resolving '{}' on {} (retry hint {}, backup selector {:?})",
            description,
            page_url,
            options.retry_count,
            options.backup_selector
        );

        if options.use_history {
            step!(verbose, Stage::HistoryLookup, "Looking up history");
            if let Some(cached) = self
                .store
                .find_latest_successful(description, &page_url)
                .await
            {
                let selector = cached.resolved_selector();
                step!(
                    verbose,
                    Stage::ValidateCached,
                    "Found history selector '{}' recorded on {}",
                    selector,
                    cached.page_url
                );
                if SelectorValidator::exists(backend, selector).await {
                    step!(verbose, Stage::Success, "Reusing '{}'", selector);
                    return Ok(ElementHandle {
                        description: description.to_string(),
                        selector: selector.to_string(),
                        source: HandleSource::History,
                    });
                }
                step!(
                    verbose,
                    Stage::ValidateCached,
                    "History selector '{}' is stale, asking the oracle",
                    selector
                );
            }
        }

        self.infer(backend, description, &page_url, options).await
    }

    async fn infer<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        description: &str,
        page_url: &str,
        options: &GetByAiOptions,
    ) -> Result<ElementHandle, ResolutionError> {
        let verbose = options.log;
        let dom = sanitize(&backend.body_html().await?);
        let prompt = build_prompt(&self.config.prompt.template_path, description, &dom).await?;

        if let Some(artifacts) = &self.artifacts
            && let Err(e) = artifacts.save_prompt(&prompt).await
        {
            warn!("Failed to save prompt artifact: {}", e);
        }

        let request = OracleRequest {
            prompt,
            model: self.model_for(options),
            timeout: options.timeout.map(Duration::from_millis),
        };
        step!(verbose, Stage::Infer, "Asking {} for '{}'", request.model, description);
        let answer = self.oracle.infer(&request).await?;

        if let Some(artifacts) = &self.artifacts
            && let Err(e) = artifacts.save_answer(&answer).await
        {
            warn!("Failed to save answer artifact: {}", e);
        }

        let selector = answer.selector;
        let found = SelectorValidator::exists(backend, &selector).await;
        step!(
            verbose,
            Stage::ValidateInferred,
            "Oracle selector '{}' {}",
            selector,
            if found { "matches" } else { "matches nothing" }
        );

        step!(verbose, Stage::Record, "Recording outcome");
        let record = HistoryRecord::new(
            self.next_timestamp(),
            page_url,
            description,
            dom,
            selector.clone(),
            found,
        );
        if let Err(e) = self.store.record(record).await {
            warn!("Failed to record history: {}", e);
        }

        if found {
            step!(verbose, Stage::Success, "Resolved '{}' to '{}'", description, selector);
            Ok(ElementHandle {
                description: description.to_string(),
                selector,
                source: HandleSource::Oracle,
            })
        } else {
            step!(verbose, Stage::Fail, "No element for '{}'", description);
            Err(ResolutionError::ElementNotFound {
                description: description.to_string(),
                selector,
            })
        }
    }

    /// Wall-clock millis, bumped past the previous record so newer answers
    /// never tie with older ones.
    fn next_timestamp(&self) -> u64 {
        let now = now_millis();
        let previous = self
            .last_timestamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    fn model_for(&self, options: &GetByAiOptions) -> String {
        options
            .model
            .clone()
            .unwrap_or_else(|| self.config.oracle.model.clone())
    }
}

fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
