//! Security middleware: CORS, response headers and request body limits.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{self, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

mod defaults {
    /// Default maximum request body size: 25 MiB.
    pub const MAX_BODY_SIZE: usize = 25 * 1024 * 1024;

    pub const CORS_MAX_AGE: u64 = 3600;

    pub fn max_body_size() -> usize {
        MAX_BODY_SIZE
    }

    pub fn cors_max_age() -> u64 {
        CORS_MAX_AGE
    }
}

/// Origins allowed when none are configured.
const LOCALHOST_ORIGINS: [&str; 5] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
    "http://localhost:5173",
];

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers CORS, security headers and body limits with the provided configuration.
    fn with_security(self, config: &SecurityConfig) -> Self;

    /// Layers security middleware with the default configuration.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, config: &SecurityConfig) -> Self {
        let cors = &config.cors;
        let cors_layer = CorsLayer::new()
            .allow_origin(cors.to_header_values())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(cors.allow_credentials)
            .max_age(cors.max_age());

        self.layer(DefaultBodyLimit::max(config.max_body_size))
            .layer(RequestBodyLimitLayer::new(config.max_body_size))
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
    }

    fn with_default_security(self) -> Self {
        self.with_security(&SecurityConfig::default())
    }
}

/// Security middleware configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityConfig {
    /// CORS configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub cors: CorsConfig,

    /// Maximum size in bytes of a request body, multipart envelope included.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_BODY_SIZE", default_value_t = defaults::MAX_BODY_SIZE)
    )]
    #[serde(default = "defaults::max_body_size")]
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors: CorsConfig::default(),
            max_body_size: defaults::MAX_BODY_SIZE,
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    ///
    /// If empty, defaults to localhost origins for development.
    #[cfg_attr(
        feature = "config",
        arg(long = "cors-origins", env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value_t = defaults::CORS_MAX_AGE)
    )]
    #[serde(default = "defaults::cors_max_age")]
    pub max_age_seconds: u64,

    /// Whether to allow credentials in CORS requests.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value = "false")
    )]
    #[serde(default)]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: defaults::CORS_MAX_AGE,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    /// Returns the CORS max age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Converts configured origins to header values, falling back to localhost.
    ///
    /// Origins that are not valid header values are skipped.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        if self.allowed_origins.is_empty() {
            LOCALHOST_ORIGINS
                .into_iter()
                .map(HeaderValue::from_static)
                .collect()
        } else {
            self.allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum_test::TestServer;

    use super::*;

    #[test]
    fn localhost_origins_by_default() {
        let origins = CorsConfig::default().to_header_values();
        assert_eq!(origins.len(), 5);
    }

    #[test]
    fn invalid_origins_are_skipped() {
        let config = CorsConfig {
            allowed_origins: vec!["https://example.com".to_string(), "bad\norigin".to_string()],
            ..Default::default()
        };
        assert_eq!(config.to_header_values().len(), 1);
    }

    #[tokio::test]
    async fn oversized_body_is_413() -> anyhow::Result<()> {
        let config = SecurityConfig {
            max_body_size: 8,
            ..Default::default()
        };
        let router = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .with_security(&config);
        let server = TestServer::new(router)?;

        server
            .post("/echo")
            .text("0123456789abcdef")
            .await
            .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        let response = server.post("/echo").text("small").await;
        response.assert_status_ok();
        response.assert_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff");
        Ok(())
    }
}
