#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for recognizer operations.
pub const TRACING_TARGET_RECOGNIZER: &str = "ocular_core::recognizer";

/// Tracing target for the backend liveness probe.
pub const TRACING_TARGET_PROBE: &str = "ocular_core::probe";

mod backend;
mod error;
mod probe;
mod prompt;
mod recognizer;
mod request;

#[cfg(any(test, feature = "mock"))]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;
#[doc(hidden)]
pub mod prelude;

pub use crate::backend::{BackendError, BackendResult, ChatBackend, SharedBackend};
pub use crate::error::{BoxedError, Error, ErrorCode, Result};
pub use crate::probe::{LivenessProbe, ProbeConfig};
pub use crate::prompt::{
    DEFAULT_MARKDOWN_SYSTEM_PROMPT, DEFAULT_OCR_SYSTEM_PROMPT, PromptPreset,
};
pub use crate::recognizer::{DEFAULT_MODEL, Recognizer, SUPPORTED_IMAGE_TYPES};
pub use crate::request::{RecognitionRequest, RecognitionRequestBuilder};
