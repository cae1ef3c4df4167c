//! Response types of the HTTP handlers.

mod error_response;
mod monitors;
mod ocr;

pub use error_response::ErrorResponse;
pub use monitors::{BackendHealth, PingStatus, ServerStatus};
pub use ocr::{ImageReport, RecognizedText};
