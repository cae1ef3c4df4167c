//! Middleware configuration for the HTTP server.
//!
//! ```bash
//! ocular --cors-origins "https://example.com" --request-timeout 60
//! ```

use clap::Args;
use ocular_server::middleware::{RecoveryConfig, SecurityConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Middleware configuration combining security and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS and body size limits.
    #[clap(flatten)]
    pub security: SecurityConfig,

    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.security.cors.allowed_origins,
            credentials = self.security.cors.allow_credentials,
            max_body_size = self.security.max_body_size,
            "Security configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}
