//! Request types of the HTTP handlers.

mod ocr;

pub use ocr::OcrRequest;
