//! Model backend abstraction.

use std::sync::Arc;

use thiserror::Error;

use crate::error::BoxedError;

/// Type alias for a shared, dynamically dispatched backend.
pub type SharedBackend = Arc<dyn ChatBackend>;

/// Type alias for Results of backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Failure signal of a backend call.
///
/// Backends must report a refused or unreachable connection as
/// [`BackendError::ConnectionRefused`]; the recognizer relies on it to tell an
/// offline server apart from a failed request.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend host refused or could not accept the connection.
    #[error("connection refused: {0}")]
    ConnectionRefused(#[source] BoxedError),

    /// Any other failure: timeout, malformed response, server error.
    #[error("{0}")]
    Other(#[source] BoxedError),
}

impl BackendError {
    /// Creates a connection-refused error.
    pub fn connection_refused(source: impl Into<BoxedError>) -> Self {
        Self::ConnectionRefused(source.into())
    }

    /// Creates a generic backend error.
    pub fn other(source: impl Into<BoxedError>) -> Self {
        Self::Other(source.into())
    }

    /// Returns whether this is a connection failure.
    pub const fn is_connection_refused(&self) -> bool {
        matches!(self, Self::ConnectionRefused(_))
    }
}

/// Chat-style model backend able to read an attached image.
///
/// One call to [`ChatBackend::chat`] corresponds to one request to the model
/// server; implementations must not retry internally.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends `instruction` with the base64-encoded `image` to `model` and
    /// returns the message content of the reply.
    async fn chat(&self, model: &str, instruction: &str, image: &str) -> BackendResult<String>;

    /// Checks that the backend is reachable.
    async fn health_check(&self) -> BackendResult<()>;

    /// Returns a printable address of the backend.
    fn endpoint(&self) -> String;
}
