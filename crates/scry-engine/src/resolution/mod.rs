pub mod engine;
pub mod result;

pub use engine::ResolutionEngine;
pub use result::{ElementHandle, HandleSource, ResolutionError, Stage};
