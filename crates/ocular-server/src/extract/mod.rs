//! Request extractors reporting rejections as [`Error`](crate::handler::Error).

mod json;
mod multipart;
mod source;

pub use self::json::Json;
pub use self::multipart::Multipart;
pub use self::source::OcrInput;
