//! Recognition request.

use std::path::{Path, PathBuf};

use derive_builder::Builder;

use crate::prompt::DEFAULT_OCR_SYSTEM_PROMPT;
use crate::recognizer::DEFAULT_MODEL;

/// A single recognition request.
///
/// The file must already exist on the local filesystem. Fields are read-only
/// once the request is built.
///
/// # Examples
///
/// ```rust
/// use ocular_core::RecognitionRequest;
///
/// let request = RecognitionRequest::builder()
///     .with_file_path("scans/receipt.png")
///     .with_model("llava")
///     .build()
///     .expect("file path is set");
///
/// assert_eq!(request.model(), "llava");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(
    name = "RecognitionRequestBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with")
)]
pub struct RecognitionRequest {
    /// Local path of the image.
    file_path: PathBuf,
    /// Model identifier override.
    #[builder(default)]
    model: Option<String>,
    /// Instruction prompt override.
    #[builder(default)]
    system_prompt: Option<String>,
}

impl RecognitionRequest {
    /// Creates a request for `file_path` with the default model and prompt.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            model: None,
            system_prompt: None,
        }
    }

    /// Creates a new request builder.
    pub fn builder() -> RecognitionRequestBuilder {
        RecognitionRequestBuilder::default()
    }

    /// Returns a copy of this request with the model replaced.
    #[must_use]
    pub fn with_model(self, model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..self
        }
    }

    /// Returns a copy of this request with the prompt replaced.
    #[must_use]
    pub fn with_system_prompt(self, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(prompt.into()),
            ..self
        }
    }

    /// Returns the image path.
    #[inline]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Returns the effective model identifier.
    #[inline]
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Returns the effective instruction prompt.
    #[inline]
    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_OCR_SYSTEM_PROMPT)
    }
}
