//! Prelude module for ocular-core.
//!
//! Re-exports the types most callers need to run a recognition.

pub use crate::backend::{BackendError, ChatBackend, SharedBackend};
pub use crate::error::{Error, ErrorCode, Result};
pub use crate::probe::{LivenessProbe, ProbeConfig};
pub use crate::prompt::PromptPreset;
pub use crate::recognizer::Recognizer;
pub use crate::request::RecognitionRequest;
