use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ocular_core::ErrorCode;
use serde::Serialize;

/// JSON body of every error response.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse<'a> {
    /// The error name/type identifier
    pub name: Cow<'a, str>,
    /// User-friendly error message safe for client display
    pub message: Cow<'a, str>,
    /// Recognition error code, when the recognizer produced the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Internal context for logs (not serialized)
    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized)
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "The request could not be processed due to invalid data",
        StatusCode::BAD_REQUEST,
    );
    pub const FILE_NOT_FOUND: Self = Self::new(
        "file_not_found",
        "The image file was not found",
        StatusCode::NOT_FOUND,
    );
    pub const MISSING_SOURCE: Self = Self::new(
        "missing_source",
        "No file or URL provided",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self = Self::new(
        "not_found",
        "The requested resource was not found",
        StatusCode::NOT_FOUND,
    );
    pub const PAYLOAD_TOO_LARGE: Self = Self::new(
        "payload_too_large",
        "The image exceeds the maximum allowed size",
        StatusCode::PAYLOAD_TOO_LARGE,
    );
    pub const SOURCE_FETCH_FAILED: Self = Self::new(
        "source_fetch_failed",
        "Failed to fetch image from URL",
        StatusCode::BAD_REQUEST,
    );
    pub const UNSUPPORTED_FILE_TYPE: Self = Self::new(
        "unsupported_file_type",
        "The image type is not supported",
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
    );
    // 5xx Server Errors
    pub const BACKEND_NOT_READY: Self = Self::new(
        "backend_not_ready",
        "The model server is not available yet. Please try again in a minute",
        StatusCode::SERVICE_UNAVAILABLE,
    );
    pub const BACKEND_UNAVAILABLE: Self = Self::new(
        "backend_unavailable",
        "Failed to connect to the model server",
        StatusCode::SERVICE_UNAVAILABLE,
    );
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "An internal server error occurred. Please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const PROCESSING_FAILED: Self = Self::new(
        "processing_failed",
        "OCR processing failed",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const REQUEST_TIMEOUT: Self = Self::new(
        "request_timeout",
        "The request took too long to process",
        StatusCode::SERVICE_UNAVAILABLE,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            code: None,
            context: None,
            status,
        }
    }

    /// Replaces the default message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the recognition error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches context to the error response.
    /// If context already exists, it merges them with a separator.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let new_context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_context)),
            None => new_context,
        });
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_replaced() {
        let response = ErrorResponse::BAD_REQUEST.with_message("Invalid URL");
        assert_eq!(response.message, "Invalid URL");
    }

    #[test]
    fn context_is_merged() {
        let response = ErrorResponse::INTERNAL_SERVER_ERROR
            .with_context("write failed")
            .with_context("disk full");

        assert_eq!(response.context.as_deref(), Some("write failed; disk full"));
    }

    #[test]
    fn serialization_skips_internal_fields() {
        let response = ErrorResponse::UNSUPPORTED_FILE_TYPE
            .with_code(ErrorCode::UnsupportedFileType)
            .with_context("extension .gif");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["name"], "unsupported_file_type");
        assert_eq!(json["code"], "UNSUPPORTED_FILE_TYPE");
        assert!(json.get("context").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn code_is_omitted_when_absent() {
        let json = serde_json::to_value(ErrorResponse::MISSING_SOURCE).unwrap();
        assert!(json.get("code").is_none());
        assert_eq!(json["message"], "No file or URL provided");
    }
}
