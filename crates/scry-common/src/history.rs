//! Resolution history: the on-disk selector cache.
//!
//! A [`History`] is an insertion-ordered list of [`HistoryRecord`]s serialized
//! as a single JSON array. At most one record exists per [`HistoryKey`]; a new
//! selector for an existing description and page becomes a separate record, so
//! the history accumulates candidates and lookups pick the newest successful one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured answer produced by the selector oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorAnswer {
    pub selector: String,
}

impl SelectorAnswer {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

/// One remembered resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub page_url: String,
    pub element_description: String,
    /// Sanitized DOM captured for this attempt. Never used for matching.
    #[serde(rename = "pageDOM")]
    pub page_snapshot: String,
    pub ai_response: SelectorAnswer,
    #[serde(rename = "elementFound")]
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl HistoryRecord {
    pub fn new(
        timestamp: u64,
        page_url: impl Into<String>,
        element_description: impl Into<String>,
        page_snapshot: impl Into<String>,
        selector: impl Into<String>,
        found: bool,
    ) -> Self {
        Self {
            timestamp,
            page_url: page_url.into(),
            element_description: element_description.into(),
            page_snapshot: page_snapshot.into(),
            ai_response: SelectorAnswer::new(selector),
            found,
            id: None,
        }
    }

    pub fn resolved_selector(&self) -> &str {
        &self.ai_response.selector
    }

    pub fn key(&self) -> HistoryKey<'_> {
        HistoryKey {
            page_url: &self.page_url,
            element_description: &self.element_description,
            selector: &self.ai_response.selector,
        }
    }
}

/// Identity of a record: page, description and selector together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryKey<'a> {
    pub page_url: &'a str,
    pub element_description: &'a str,
    pub selector: &'a str,
}

impl fmt::Display for HistoryKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.page_url, self.element_description, self.selector
        )
    }
}

/// What [`History::upsert`] did with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Updated(usize),
    Appended(usize),
}

/// Why a history document yielded no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The backing file does not exist.
    Missing,
    /// The document is not valid JSON, or its entries do not fit the record shape.
    Malformed(String),
    /// Valid JSON, but not an array.
    NotAnArray,
    /// The file exists but could not be read.
    Unreadable(String),
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::Missing => write!(f, "history file is missing"),
            EmptyReason::Malformed(reason) => write!(f, "history file is malformed: {}", reason),
            EmptyReason::NotAnArray => write!(f, "history file is not an array"),
            EmptyReason::Unreadable(reason) => write!(f, "history file is unreadable: {}", reason),
        }
    }
}

/// Outcome of reading a history document. Never an error: anything unusable
/// is an empty history with a reason attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryLoad {
    Loaded(History),
    Empty(EmptyReason),
}

impl HistoryLoad {
    pub fn into_history(self) -> History {
        match self {
            HistoryLoad::Loaded(history) => history,
            HistoryLoad::Empty(_) => History::default(),
        }
    }

    pub fn empty_reason(&self) -> Option<&EmptyReason> {
        match self {
            HistoryLoad::Loaded(_) => None,
            HistoryLoad::Empty(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }

    /// Parse a serialized history document.
    pub fn parse(text: &str) -> HistoryLoad {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => return HistoryLoad::Empty(EmptyReason::Malformed(e.to_string())),
        };

        if !value.is_array() {
            return HistoryLoad::Empty(EmptyReason::NotAnArray);
        }

        match serde_json::from_value::<Vec<HistoryRecord>>(value) {
            Ok(records) => HistoryLoad::Loaded(Self::from_records(records)),
            Err(e) => HistoryLoad::Empty(EmptyReason::Malformed(e.to_string())),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records)
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<HistoryRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn successful_count(&self) -> usize {
        self.records.iter().filter(|r| r.found).count()
    }

    pub fn position(&self, key: &HistoryKey<'_>) -> Option<usize> {
        self.records.iter().position(|r| r.key() == *key)
    }

    /// Latest successful record for `description`.
    ///
    /// Records on `page_url` win over records from other pages regardless of
    /// age; within a tier the highest timestamp wins, and equal timestamps go
    /// to the earliest inserted record.
    pub fn find_latest_successful(
        &self,
        description: &str,
        page_url: &str,
    ) -> Option<&HistoryRecord> {
        let matches = |r: &&HistoryRecord| r.found && r.element_description == description;

        newest(
            self.records
                .iter()
                .filter(|r| matches(r) && r.page_url == page_url),
        )
        .or_else(|| newest(self.records.iter().filter(matches)))
    }

    /// Insert `record`, or refresh the record sharing its key in place.
    ///
    /// Only `timestamp`, `found` and `page_snapshot` are refreshed; position
    /// and `id` of the existing record are kept.
    pub fn upsert(&mut self, record: HistoryRecord) -> Upsert {
        match self.position(&record.key()) {
            Some(index) => {
                let existing = &mut self.records[index];
                existing.timestamp = record.timestamp;
                existing.found = record.found;
                existing.page_snapshot = record.page_snapshot;
                Upsert::Updated(index)
            }
            None => {
                self.records.push(record);
                Upsert::Appended(self.records.len() - 1)
            }
        }
    }
}

fn newest<'a>(records: impl Iterator<Item = &'a HistoryRecord>) -> Option<&'a HistoryRecord> {
    records.fold(None, |best: Option<&HistoryRecord>, r| match best {
        Some(b) if b.timestamp >= r.timestamp => Some(b),
        _ => Some(r),
    })
}
