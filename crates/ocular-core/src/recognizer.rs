//! Input validation and dispatch to the model backend.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jiff::Timestamp;

use crate::backend::{BackendError, SharedBackend};
use crate::error::{Error, Result};
use crate::request::RecognitionRequest;
use crate::TRACING_TARGET_RECOGNIZER;

/// Lowercase image extensions accepted by the recognizer.
pub const SUPPORTED_IMAGE_TYPES: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "llama3.2-vision";

/// Validates image files and forwards them to a [`ChatBackend`].
///
/// The recognizer holds no mutable state and is cheap to clone; concurrent
/// calls are independent.
///
/// [`ChatBackend`]: crate::ChatBackend
#[derive(Clone)]
pub struct Recognizer {
    backend: SharedBackend,
}

impl Recognizer {
    /// Creates a recognizer dispatching to `backend`.
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Returns the backend this recognizer dispatches to.
    #[inline]
    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    /// Recognizes the text in the image at `request.file_path()`.
    ///
    /// Checks run in a fixed order: existence, then extension, then the
    /// backend call. The backend content is returned verbatim.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if no regular file exists at the path.
    /// - [`Error::UnsupportedFileType`] if the extension is not supported.
    /// - [`Error::BackendUnavailable`] if the backend refused the connection.
    /// - [`Error::ProcessingFailed`] for read failures and any other backend error.
    pub async fn recognize(&self, request: &RecognitionRequest) -> Result<String> {
        let path = request.file_path();

        if !is_regular_file(path).await {
            tracing::debug!(
                target: TRACING_TARGET_RECOGNIZER,
                path = %path.display(),
                "Image file not found"
            );
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let extension = lowercase_extension(path);
        if !SUPPORTED_IMAGE_TYPES.contains(&extension.as_str()) {
            tracing::debug!(
                target: TRACING_TARGET_RECOGNIZER,
                path = %path.display(),
                extension = %extension,
                "Unsupported image type"
            );
            return Err(Error::UnsupportedFileType { extension });
        }

        let image = tokio::fs::read(path).await.map_err(Error::processing)?;
        let image_size = image.len();
        let image = STANDARD.encode(image);

        let model = request.model();
        let started_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET_RECOGNIZER,
            path = %path.display(),
            model = %model,
            image_size = image_size,
            endpoint = %self.backend.endpoint(),
            "Dispatching recognition request"
        );

        let result = self
            .backend
            .chat(model, request.system_prompt(), &image)
            .await;
        let processing_time = Timestamp::now().duration_since(started_at);

        match result {
            Ok(text) => {
                tracing::debug!(
                    target: TRACING_TARGET_RECOGNIZER,
                    model = %model,
                    text_len = text.len(),
                    processing_time_ms = processing_time.as_millis(),
                    "Recognition completed"
                );
                Ok(text)
            }
            Err(BackendError::ConnectionRefused(source)) => {
                tracing::warn!(
                    target: TRACING_TARGET_RECOGNIZER,
                    endpoint = %self.backend.endpoint(),
                    error = %source,
                    "Model backend is unreachable"
                );
                Err(Error::BackendUnavailable { source })
            }
            Err(BackendError::Other(source)) => {
                tracing::warn!(
                    target: TRACING_TARGET_RECOGNIZER,
                    model = %model,
                    error = %source,
                    processing_time_ms = processing_time.as_millis(),
                    "Recognition failed"
                );
                Err(Error::processing(source))
            }
        }
    }
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("endpoint", &self.backend.endpoint())
            .finish()
    }
}

/// Returns whether a regular file exists at `path`, following symlinks.
async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

/// Returns the lowercase extension of `path` with a leading dot, or an empty
/// string when there is none.
fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
