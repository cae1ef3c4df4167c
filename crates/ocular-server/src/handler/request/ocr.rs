use serde::{Deserialize, Serialize};

/// JSON body of `POST /ocr` and `POST /test-image`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrRequest {
    /// Image to download.
    #[serde(default)]
    pub url: Option<String>,
    /// Model identifier override.
    #[serde(default)]
    pub model: Option<String>,
    /// Preset name (`ocr`, `markdown`) or literal instruction text.
    #[serde(default)]
    pub prompt: Option<String>,
}
