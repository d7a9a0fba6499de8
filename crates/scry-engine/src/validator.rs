use crate::backend::Backend;
use tracing::{debug, warn};

/// Checks candidate selectors against the live page.
pub struct SelectorValidator;

impl SelectorValidator {
    /// Whether `selector` currently matches an element.
    ///
    /// Selectors come from the oracle and are untrusted, so a failing query
    /// (bad syntax included) counts as "not found" instead of an error.
    pub async fn exists<B: Backend + ?Sized>(backend: &mut B, selector: &str) -> bool {
        match backend.query_selector(selector).await {
            Ok(exists) => {
                debug!(
                    "Selector {}: {}",
                    if exists { "exists" } else { "does not exist" },
                    selector
                );
                exists
            }
            Err(e) if e.is_fatal() => {
                warn!("Selector check for '{}' failed: {}", selector, e);
                false
            }
            Err(e) => {
                debug!("Selector '{}' could not be queried: {}", selector, e);
                false
            }
        }
    }
}
