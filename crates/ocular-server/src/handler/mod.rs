//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ocular_core::mock::MockBackend;
//! use ocular_server::handler::routes;
//! use ocular_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let state = ServiceState::from_config(&config, Arc::new(MockBackend::replying(""))).await?;
//! let router: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
mod ocr;
pub mod request;
pub mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes and the not-found fallback.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(monitors::routes())
        .merge(ocr::routes())
        .fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use axum_test::TestServer;
    use ocular_core::mock::MockBackend;
    use ocular_core::{ProbeConfig, SharedBackend};
    use tempfile::TempDir;

    use crate::handler::routes;
    use crate::service::{ServiceConfig, ServiceState};

    /// Test server wired to a [`MockBackend`] and a private uploads directory.
    pub struct TestContext {
        pub server: TestServer,
        pub backend: Arc<MockBackend>,
        pub uploads: TempDir,
    }

    impl TestContext {
        /// Returns a context with the liveness probe disabled.
        pub async fn new(backend: MockBackend) -> anyhow::Result<Self> {
            Self::with_config(backend, ServiceConfig::default().with_probe(ProbeConfig::disabled()))
                .await
        }

        /// Returns a context with the given probe configuration.
        pub async fn with_probe(backend: MockBackend, probe: ProbeConfig) -> anyhow::Result<Self> {
            Self::with_config(backend, ServiceConfig::default().with_probe(probe)).await
        }

        /// Returns a context with the given maximum image size.
        pub async fn with_max_file_size(
            backend: MockBackend,
            max_file_size: usize,
        ) -> anyhow::Result<Self> {
            let config = ServiceConfig::default()
                .with_probe(ProbeConfig::disabled())
                .with_max_file_size(max_file_size);
            Self::with_config(backend, config).await
        }

        async fn with_config(backend: MockBackend, config: ServiceConfig) -> anyhow::Result<Self> {
            let uploads = TempDir::new()?;
            let config = config.with_uploads_dir(uploads.path());

            let backend = Arc::new(backend);
            let shared: SharedBackend = backend.clone();
            let state = ServiceState::from_config(&config, shared).await?;

            let server = TestServer::new(routes().with_state(state))?;
            Ok(Self {
                server,
                backend,
                uploads,
            })
        }

        /// Returns whether no temporary image remains on disk.
        pub fn uploads_is_empty(&self) -> bool {
            std::fs::read_dir(self.uploads.path())
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false)
        }
    }

    #[tokio::test]
    async fn unknown_route_is_404() -> anyhow::Result<()> {
        let context = TestContext::new(MockBackend::replying("")).await?;

        let response = context.server.get("/does-not-exist").await;
        response.assert_status_not_found();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}
