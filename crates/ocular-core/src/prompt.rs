//! Built-in instruction prompts.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Default instruction for plain transcription.
pub const DEFAULT_OCR_SYSTEM_PROMPT: &str = "Act as an OCR assistant. Analyze the provided image and:
    1. Recognize all visible text in the image as accurately as possible.
    2. Maintain the original structure and formatting of the text.
    3. If any words or phrases are unclear, indicate this with [unclear] in your transcription.

    Provide only the transcription without any additional comments.";

/// Default instruction for Markdown transcription.
pub const DEFAULT_MARKDOWN_SYSTEM_PROMPT: &str = "Convert the provided image into Markdown format. Ensure that all content from the page is included, such as headers, footers, subtexts, images (with alt text if possible), tables, and any other elements.

  Requirements:
  - Output Only Markdown: Return solely the Markdown content without any additional explanations or comments.
  - No Delimiters: Do not use code fences or delimiters like ```markdown.
  - Complete Content: Do not omit any part of the page, including headers, footers, and subtext.
  ";

/// Named selection of a built-in prompt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PromptPreset {
    /// Plain transcription, see [`DEFAULT_OCR_SYSTEM_PROMPT`].
    #[default]
    Ocr,
    /// Markdown transcription, see [`DEFAULT_MARKDOWN_SYSTEM_PROMPT`].
    Markdown,
}

impl PromptPreset {
    /// Returns the instruction text of this preset.
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Ocr => DEFAULT_OCR_SYSTEM_PROMPT,
            Self::Markdown => DEFAULT_MARKDOWN_SYSTEM_PROMPT,
        }
    }

    /// Resolves a user-supplied prompt: a preset name selects that preset,
    /// anything else is taken as literal instruction text.
    pub fn resolve(prompt: &str) -> String {
        prompt
            .trim()
            .parse::<Self>()
            .map(|preset| preset.instruction().to_string())
            .unwrap_or_else(|_| prompt.to_string())
    }
}
