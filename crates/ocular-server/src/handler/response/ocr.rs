use serde::{Deserialize, Serialize};

/// Text recognized in an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedText {
    /// Backend content, verbatim.
    pub text: String,
}

/// Outcome of storing an image without recognizing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReport {
    pub success: bool,
    pub message: String,
    /// Temporary path the image was written to.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
}
