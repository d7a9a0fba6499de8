pub mod artifacts;
pub mod backend;
pub mod cli;
pub mod config;
pub mod executor;
pub mod history;
pub mod oracle;
pub mod prompt;
pub mod resolution;
pub mod validator;

pub use scry_common::error;
pub use scry_common::sanitize;
