pub mod backend_error;

pub use backend_error::BackendError;
