//! Errors raised while assembling the service state.

use std::io;
use std::path::PathBuf;

/// Result type alias for service setup operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error returned when the service cannot be initialized.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The uploads directory could not be created.
    #[error("failed to prepare uploads directory '{}'", .path.display())]
    UploadsDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The HTTP client used to fetch image URLs could not be built.
    #[error("failed to build the image fetch client")]
    HttpClient(#[source] reqwest::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Creates a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
