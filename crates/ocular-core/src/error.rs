//! Recognition error taxonomy.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

use crate::recognizer::SUPPORTED_IMAGE_TYPES;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with the recognition [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Wire code of a recognition [`Error`].
///
/// Codes are mutually exclusive and listed in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No regular file exists at the requested path.
    FileNotFound,
    /// The file extension is not a supported image type.
    UnsupportedFileType,
    /// The model backend could not be reached.
    BackendUnavailable,
    /// Reading the image or the backend call failed.
    ProcessingFailed,
}

/// Error returned by [`Recognizer::recognize`].
///
/// Exactly one variant is produced per failed call.
///
/// [`Recognizer::recognize`]: crate::Recognizer::recognize
#[derive(Debug, Error)]
#[must_use = "errors do nothing unless handled"]
pub enum Error {
    /// No regular file exists at `path`.
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// The lowercase extension of the file is not in [`SUPPORTED_IMAGE_TYPES`].
    #[error(
        "Unsupported file type: {extension}. Supported types: {}",
        SUPPORTED_IMAGE_TYPES.join(", ")
    )]
    UnsupportedFileType { extension: String },

    /// The backend refused the connection.
    #[error("Failed to connect to the model server. Please ensure the server is running.")]
    BackendUnavailable {
        #[source]
        source: BoxedError,
    },

    /// Any other failure after validation passed.
    #[error("OCR processing failed: {message}")]
    ProcessingFailed {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },
}

impl Error {
    /// Creates a processing error that wraps `source` and reuses its description.
    pub fn processing(source: impl Into<BoxedError>) -> Self {
        let source = source.into();
        Self::ProcessingFailed {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Returns the wire code of this error.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::FileNotFound { .. } => ErrorCode::FileNotFound,
            Self::UnsupportedFileType { .. } => ErrorCode::UnsupportedFileType,
            Self::BackendUnavailable { .. } => ErrorCode::BackendUnavailable,
            Self::ProcessingFailed { .. } => ErrorCode::ProcessingFailed,
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn file_not_found_message_contains_path() {
        let error = Error::FileNotFound {
            path: PathBuf::from("test/images/non-existent.jpg"),
        };

        assert_eq!(
            error.to_string(),
            "File not found: test/images/non-existent.jpg"
        );
        assert_eq!(error.code(), ErrorCode::FileNotFound);
    }

    #[test]
    fn unsupported_type_lists_supported_set() {
        let error = Error::UnsupportedFileType {
            extension: ".txt".to_string(),
        };

        assert_eq!(
            error.message(),
            "Unsupported file type: .txt. Supported types: .jpg, .jpeg, .png"
        );
    }

    #[test]
    fn processing_wraps_source_description() {
        let error = Error::processing(io::Error::other("disk on fire"));

        assert_eq!(error.code(), ErrorCode::ProcessingFailed);
        assert_eq!(error.message(), "OCR processing failed: disk on fire");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn codes_serialize_screaming_snake_case() {
        assert_eq!(ErrorCode::FileNotFound.as_ref(), "FILE_NOT_FOUND");
        assert_eq!(ErrorCode::UnsupportedFileType.to_string(), "UNSUPPORTED_FILE_TYPE");
        assert_eq!(ErrorCode::BackendUnavailable.as_ref(), "BACKEND_UNAVAILABLE");
        assert_eq!(ErrorCode::ProcessingFailed.as_ref(), "PROCESSING_FAILED");
    }
}
