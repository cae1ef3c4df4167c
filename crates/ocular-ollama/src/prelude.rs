//! Convenient re-exports for common use.

pub use crate::client::OllamaClient;
pub use crate::config::OllamaConfig;
pub use crate::error::{Error, Result};
