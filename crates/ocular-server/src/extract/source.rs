//! Extraction of the image source and recognition options.

use axum::body::Bytes;
use axum::extract::{FromRef, FromRequest, Request};
use axum::http::{HeaderMap, header};
use url::Url;

use crate::extract::{Json, Multipart};
use crate::handler::request::OcrRequest;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{ImageSource, UploadStore};

/// Tracing target for source extraction.
const TRACING_TARGET: &str = "ocular_server::extract::source";

/// Image source plus the optional recognition overrides of a request.
///
/// Reads `multipart/form-data` with the fields `file`, `url`, `model` and
/// `prompt`, or a JSON [`OcrRequest`]. A URL takes precedence over an
/// uploaded file. Uploads larger than the configured maximum are rejected
/// while streaming.
#[derive(Debug, Clone)]
pub struct OcrInput {
    /// Where the image comes from.
    pub source: ImageSource,
    /// Model identifier override.
    pub model: Option<String>,
    /// Preset name or literal instruction text.
    pub prompt: Option<String>,
}

/// Raw form values before validation.
#[derive(Debug, Default)]
struct FormValues {
    file: Option<(Option<String>, Bytes)>,
    url: Option<String>,
    model: Option<String>,
    prompt: Option<String>,
}

impl<S> FromRequest<S> for OcrInput
where
    S: Send + Sync,
    UploadStore: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let max_file_size = UploadStore::from_ref(state).max_file_size();

        let values = if is_multipart(req.headers()) {
            let Multipart(multipart) = Multipart::from_request(req, state).await?;
            read_multipart(multipart, max_file_size).await?
        } else if req.headers().contains_key(header::CONTENT_TYPE) {
            let Json(request) = Json::<OcrRequest>::from_request(req, state).await?;
            FormValues {
                file: None,
                url: request.url,
                model: request.model,
                prompt: request.prompt,
            }
        } else {
            FormValues::default()
        };

        values.into_input()
    }
}

impl FormValues {
    fn into_input(self) -> Result<OcrInput> {
        let source = match (non_empty(self.url), self.file) {
            (Some(url), _) => ImageSource::Url(Url::parse(&url).map_err(|err| {
                ErrorKind::BadRequest
                    .with_message("Invalid image URL")
                    .with_context(format!("'{url}': {err}"))
            })?),
            (None, Some((file_name, data))) => ImageSource::Upload { file_name, data },
            (None, None) => return Err(ErrorKind::MissingSource.into_error()),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            origin = %source.origin(),
            "Image source extracted"
        );

        Ok(OcrInput {
            source,
            model: non_empty(self.model),
            prompt: self.prompt.filter(|prompt| !prompt.trim().is_empty()),
        })
    }
}

async fn read_multipart(
    mut multipart: axum::extract::Multipart,
    max_file_size: usize,
) -> Result<FormValues> {
    let mut values = FormValues::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await? {
                    if data.len() + chunk.len() > max_file_size {
                        return Err(ErrorKind::PayloadTooLarge
                            .with_message(format!(
                                "The image exceeds the maximum size of {} bytes",
                                max_file_size
                            ))
                            .with_context(format!("upload {:?}", file_name)));
                    }
                    data.extend_from_slice(&chunk);
                }

                // Browsers send an empty part when no file was chosen.
                if file_name.as_deref().is_some_and(|name| !name.is_empty()) || !data.is_empty() {
                    values.file = Some((file_name, Bytes::from(data)));
                }
            }
            Some("url") => values.url = Some(field.text().await?),
            Some("model") => values.model = Some(field.text().await?),
            Some("prompt") => values.prompt = Some(field.text().await?),
            name => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    field = name.unwrap_or_default(),
                    "Skipping unknown form field"
                );
            }
        }
    }

    Ok(values)
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_wins_over_file() {
        let values = FormValues {
            file: Some((Some("a.png".to_string()), Bytes::from_static(b"png"))),
            url: Some("https://cdn.test/a.jpg".to_string()),
            ..FormValues::default()
        };

        let input = values.into_input().unwrap();
        assert!(matches!(input.source, ImageSource::Url(_)));
    }

    #[test]
    fn blank_options_are_dropped() {
        let values = FormValues {
            file: Some((None, Bytes::from_static(b"png"))),
            url: Some("  ".to_string()),
            model: Some(" ".to_string()),
            prompt: Some(" markdown ".to_string()),
        };

        let input = values.into_input().unwrap();
        assert!(matches!(input.source, ImageSource::Upload { .. }));
        assert_eq!(input.model, None);
        assert_eq!(input.prompt.as_deref(), Some(" markdown "));
    }

    #[test]
    fn missing_source_is_rejected() {
        let error = FormValues::default().into_input().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingSource);
    }

    #[test]
    fn invalid_url_is_bad_request() {
        let values = FormValues {
            url: Some("not a url".to_string()),
            ..FormValues::default()
        };

        let error = values.into_input().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }
}
