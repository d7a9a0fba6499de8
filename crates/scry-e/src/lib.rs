//! Backend for an externally running WebDriver server.

pub mod backend;
pub mod webdriver;

pub use backend::EmbeddedBackend;
