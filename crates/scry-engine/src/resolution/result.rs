use crate::backend::BackendError;
use crate::oracle::OracleError;
use crate::prompt::TemplateError;
use std::fmt;
use thiserror::Error;

/// Where a resolved selector came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSource {
    History,
    Oracle,
}

/// A selector verified to match an element on the live page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub description: String,
    pub selector: String,
    pub source: HandleSource,
}

impl ElementHandle {
    pub fn from_history(&self) -> bool {
        self.source == HandleSource::History
    }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Failed to inspect page: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Selector oracle failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("Element not found for description: {description} with selector: {selector}")]
    ElementNotFound {
        description: String,
        selector: String,
    },
}

/// Steps of a single resolution, as reported in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    HistoryLookup,
    ValidateCached,
    Infer,
    ValidateInferred,
    Record,
    Success,
    Fail,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::HistoryLookup => "history_lookup",
            Stage::ValidateCached => "validate_cached",
            Stage::Infer => "infer",
            Stage::ValidateInferred => "validate_inferred",
            Stage::Record => "record",
            Stage::Success => "success",
            Stage::Fail => "fail",
        };
        f.write_str(name)
    }
}
