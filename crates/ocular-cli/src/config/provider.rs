//! Model backend construction.

use std::sync::Arc;

use anyhow::Context;
use ocular_core::SharedBackend;
use ocular_ollama::{OllamaClient, OllamaConfig};

/// Creates the Ollama backend from configuration.
///
/// # Errors
///
/// Returns an error if the configured host is not a usable HTTP address.
pub fn create_backend(config: &OllamaConfig) -> anyhow::Result<SharedBackend> {
    let client = OllamaClient::new(config.clone()).context("failed to create Ollama client")?;
    Ok(Arc::new(client))
}
