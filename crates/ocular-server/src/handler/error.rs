//! HTTP error handling with a builder pattern for dynamic error responses.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ocular_core::ErrorCode;

use crate::handler::response::ErrorResponse;
use crate::service::UploadError;

/// Tracing target for error responses.
const TRACING_TARGET: &str = "ocular_server::handler::error";

/// The error type for HTTP handlers in the server.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    context: Option<Cow<'a, str>>,
    code: Option<ErrorCode>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
            code: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Attaches internal context to the error.
    ///
    /// Context is logged but never sent to the client.
    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'a, str>>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    /// Replaces the default message of the error kind.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Sets the recognition error code.
    #[inline]
    pub fn with_code(self, code: ErrorCode) -> Self {
        Self {
            code: Some(code),
            ..self
        }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the custom message if present.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the context if present.
    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns the recognition error code if present.
    #[inline]
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();

        let mut debug_struct = f.debug_struct("Error");
        debug_struct
            .field("kind", &self.kind)
            .field("name", &response.name)
            .field("status", &response.status);

        if let Some(ref message) = self.message {
            debug_struct.field("message", message);
        }

        if let Some(ref context) = self.context {
            debug_struct.field("context", context);
        }

        if let Some(code) = self.code {
            debug_struct.field("code", &code);
        }

        debug_struct.finish()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        let message = self.message.as_deref().unwrap_or(response.message.as_ref());

        write!(f, "{} ({}): {}", response.name, response.status, message)?;

        if let Some(ref context) = self.context {
            write!(f, " - {}", context)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl<'a> IntoResponse for Error<'a> {
    fn into_response(self) -> Response {
        let mut response: ErrorResponse<'a> = self.kind.response();

        if response.status.is_server_error() {
            tracing::error!(
                target: TRACING_TARGET,
                name = %response.name,
                detail = self.message.as_deref().unwrap_or_default(),
                context = self.context.as_deref().unwrap_or_default(),
                "request failed"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET,
                name = %response.name,
                detail = self.message.as_deref().unwrap_or_default(),
                context = self.context.as_deref().unwrap_or_default(),
                "request rejected"
            );
        }

        if let Some(message) = self.message {
            response = response.with_message(message);
        }

        if let Some(code) = self.code {
            response = response.with_code(code);
        }

        if let Some(context) = self.context {
            response = response.with_context(context);
        }

        response.into_response()
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ocular_core::Error> for Error<'static> {
    fn from(error: ocular_core::Error) -> Self {
        let code = error.code();
        let kind = match code {
            ErrorCode::FileNotFound => ErrorKind::FileNotFound,
            ErrorCode::UnsupportedFileType => ErrorKind::UnsupportedFileType,
            ErrorCode::BackendUnavailable => ErrorKind::BackendUnavailable,
            ErrorCode::ProcessingFailed => ErrorKind::ProcessingFailed,
        };

        let mut http_error = kind.with_message(error.message()).with_code(code);
        if let Some(source) = std::error::Error::source(&error) {
            http_error = http_error.with_context(source.to_string());
        }

        http_error
    }
}

impl From<UploadError> for Error<'static> {
    fn from(error: UploadError) -> Self {
        let context = error.to_string();
        match error {
            UploadError::TooLarge { limit } => ErrorKind::PayloadTooLarge
                .with_message(format!("The image exceeds the maximum size of {limit} bytes")),
            UploadError::UnsupportedScheme(_) => ErrorKind::BadRequest
                .with_message("Only http and https image URLs are supported")
                .with_context(context),
            UploadError::Fetch { .. } | UploadError::FetchStatus { .. } => {
                ErrorKind::SourceFetchFailed.with_context(context)
            }
            UploadError::Io(_) => ErrorKind::InternalServerError
                .with_message("Failed to store the image")
                .with_context(context),
        }
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Enumeration of all HTTP error kinds the server returns.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // 4xx Client Errors
    /// 400 Bad Request - Invalid request data
    BadRequest,
    /// 400 Bad Request - Neither a file nor a URL was sent
    MissingSource,
    /// 400 Bad Request - The image URL could not be fetched
    SourceFetchFailed,
    /// 404 Not Found - Unknown route
    NotFound,
    /// 404 Not Found - The image file does not exist
    FileNotFound,
    /// 413 Payload Too Large - The image exceeds the size limit
    PayloadTooLarge,
    /// 415 Unsupported Media Type - The image type is not supported
    UnsupportedFileType,

    // 5xx Server Errors
    /// 500 Internal Server Error - Unexpected server error
    #[default]
    InternalServerError,
    /// 500 Internal Server Error - The model call failed
    ProcessingFailed,
    /// 503 Service Unavailable - The model server refused the connection
    BackendUnavailable,
    /// 503 Service Unavailable - The model server did not pass the liveness probe
    BackendNotReady,
    /// 503 Service Unavailable - The request deadline elapsed
    RequestTimeout,
}

impl ErrorKind {
    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    /// Creates an [`Error`] with the specified context.
    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    /// Creates an [`Error`] with the specified message.
    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    /// Returns the HTTP status code for this error kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the default response of this error kind.
    #[inline]
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingSource => ErrorResponse::MISSING_SOURCE,
            Self::SourceFetchFailed => ErrorResponse::SOURCE_FETCH_FAILED,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::FileNotFound => ErrorResponse::FILE_NOT_FOUND,
            Self::PayloadTooLarge => ErrorResponse::PAYLOAD_TOO_LARGE,
            Self::UnsupportedFileType => ErrorResponse::UNSUPPORTED_FILE_TYPE,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
            Self::ProcessingFailed => ErrorResponse::PROCESSING_FAILED,
            Self::BackendUnavailable => ErrorResponse::BACKEND_UNAVAILABLE,
            Self::BackendNotReady => ErrorResponse::BACKEND_NOT_READY,
            Self::RequestTimeout => ErrorResponse::REQUEST_TIMEOUT,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.response().name.as_ref())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn default_http_error() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_builder_chaining() {
        let error = ErrorKind::SourceFetchFailed
            .with_message("Failed to fetch image from URL")
            .with_context("status 404");

        assert_eq!(error.kind(), ErrorKind::SourceFetchFailed);
        assert_eq!(error.message(), Some("Failed to fetch image from URL"));
        assert_eq!(error.context(), Some("status 404"));
        assert_eq!(error.code(), None);
    }

    #[test]
    fn std_fmt_display() {
        let error = ErrorKind::PayloadTooLarge
            .with_message("File exceeds 20 MB")
            .with_context("upload 'scan.png'");

        let display = format!("{}", error);
        assert!(display.contains("payload_too_large"));
        assert!(display.contains("413"));
        assert!(display.contains("File exceeds 20 MB"));
        assert!(display.contains("scan.png"));
    }

    #[test]
    fn recognition_errors_map_to_statuses() {
        let cases = [
            (
                ocular_core::Error::FileNotFound {
                    path: PathBuf::from("missing.jpg"),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ocular_core::Error::UnsupportedFileType {
                    extension: ".gif".to_string(),
                },
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                ocular_core::Error::BackendUnavailable {
                    source: io::Error::from(io::ErrorKind::ConnectionRefused).into(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ocular_core::Error::processing(io::Error::other("bad model")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            let code = error.code();
            let message = error.message();
            let http_error = Error::from(error);

            assert_eq!(http_error.kind().status_code(), status);
            assert_eq!(http_error.code(), Some(code));
            assert_eq!(http_error.message(), Some(message.as_str()));
        }
    }

    #[test]
    fn upload_errors_map_to_statuses() {
        let too_large = Error::from(UploadError::TooLarge { limit: 10 });
        assert_eq!(too_large.kind().status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let url = url::Url::parse("https://cdn.test/a.png").unwrap();
        let fetch = Error::from(UploadError::FetchStatus {
            url,
            status: StatusCode::NOT_FOUND,
        });
        assert_eq!(fetch.kind(), ErrorKind::SourceFetchFailed);
        assert_eq!(fetch.kind().status_code(), StatusCode::BAD_REQUEST);

        let storage = Error::from(UploadError::Io(io::Error::other("disk full")));
        assert_eq!(storage.kind().status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn all_error_kinds_have_responses() {
        let kinds = [
            ErrorKind::BadRequest,
            ErrorKind::MissingSource,
            ErrorKind::SourceFetchFailed,
            ErrorKind::NotFound,
            ErrorKind::FileNotFound,
            ErrorKind::PayloadTooLarge,
            ErrorKind::UnsupportedFileType,
            ErrorKind::InternalServerError,
            ErrorKind::ProcessingFailed,
            ErrorKind::BackendUnavailable,
            ErrorKind::BackendNotReady,
            ErrorKind::RequestTimeout,
        ];

        for kind in kinds {
            let response = kind.response();
            assert!(!response.name.is_empty());
            assert!(response.status.as_u16() >= 400);
            let _ = kind.into_response();
        }
    }
}
