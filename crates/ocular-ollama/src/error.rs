//! Error types and failure classification for the Ollama backend.

use std::error::Error as StdError;
use std::io;

use ocular_core::BackendError;
use ollama_rs::error::OllamaError;
use thiserror::Error;

/// Error type for the ocular-ollama library.
#[derive(Error, Debug)]
pub enum Error {
    /// A request to the Ollama server failed.
    #[error("Ollama request failed: {}", describe_chain(.0))]
    Request(#[from] OllamaError),

    /// The configured host cannot address an Ollama server.
    #[error("Invalid Ollama host '{host}': {reason}")]
    InvalidHost { host: String, reason: &'static str },
}

impl Error {
    /// Creates an invalid host error.
    pub fn invalid_host(host: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidHost {
            host: host.into(),
            reason,
        }
    }

    /// Returns whether the server could not be reached at all.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            Self::Request(error) => is_connection_failure(error),
            Self::InvalidHost { .. } => false,
        }
    }
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        match error {
            Error::Request(source) if is_connection_failure(&source) => {
                BackendError::connection_refused(source)
            }
            other => BackendError::other(other),
        }
    }
}

/// Walks the source chain of `error` looking for a failed connection attempt.
///
/// Matches a `reqwest` connect error or an I/O error of kind
/// `ConnectionRefused` at any depth.
pub(crate) fn is_connection_failure(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(error) = current {
        if let Some(error) = error.downcast_ref::<reqwest::Error>()
            && error.is_connect()
        {
            return true;
        }

        if let Some(error) = error.downcast_ref::<io::Error>()
            && error.kind() == io::ErrorKind::ConnectionRefused
        {
            return true;
        }

        current = error.source();
    }

    false
}

/// Joins the descriptions along the source chain of `error`.
///
/// A source whose text is already part of the description is skipped.
fn describe_chain(error: &(dyn StdError + 'static)) -> String {
    let mut description = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !description.contains(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        current = source.source();
    }

    description
}

/// Result type alias for ocular-ollama operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "client error")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn refused_io_error_is_connection_failure() {
        let error = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(is_connection_failure(&error));
    }

    #[test]
    fn nested_refused_io_error_is_connection_failure() {
        let error = Wrapped(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(is_connection_failure(&error));
    }

    #[test]
    fn other_io_errors_are_not_connection_failures() {
        let error = Wrapped(io::Error::from(io::ErrorKind::TimedOut));
        assert!(!is_connection_failure(&error));
    }

    #[test]
    fn request_error_describes_its_cause() {
        let cause = serde_json::from_str::<u32>("{").unwrap_err();
        let detail = cause.to_string();
        let error = Error::from(OllamaError::from(cause));

        assert_eq!(
            error.to_string(),
            format!("Ollama request failed: Ollama JSON error: {detail}")
        );
    }

    #[test]
    fn repeated_descriptions_are_not_duplicated() {
        let error = Wrapped(io::Error::other("client error"));
        assert_eq!(describe_chain(&error), "client error");
    }

    #[test]
    fn invalid_host_maps_to_other() {
        let error = Error::invalid_host("ftp://models", "unsupported scheme");
        assert!(!error.is_connection_failure());
        assert!(!BackendError::from(error).is_connection_refused());
    }
}
