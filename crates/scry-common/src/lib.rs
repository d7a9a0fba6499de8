pub mod error;
pub mod history;
pub mod prompt;
pub mod sanitize;

pub use history::{
    EmptyReason, History, HistoryKey, HistoryLoad, HistoryRecord, SelectorAnswer, Upsert,
};
pub use prompt::PromptTemplate;
pub use sanitize::sanitize;
