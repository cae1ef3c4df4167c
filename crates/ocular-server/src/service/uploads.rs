//! Materialization of image sources into temporary files.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use reqwest::StatusCode;
use strum::{AsRefStr, Display};
use tempfile::TempPath;
use url::Url;

use crate::service::ServiceConfig;
use crate::{Error, Result};

/// Tracing target for upload storage.
const TRACING_TARGET: &str = "ocular_server::service::uploads";

/// Extension given to URL sources whose path has none.
const FALLBACK_URL_EXTENSION: &str = ".jpg";

/// Where an image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SourceOrigin {
    /// A multipart file upload.
    Upload,
    /// A remote URL.
    Url,
}

/// An image as received by a handler, before it is written to disk.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Bytes of an uploaded file with its client-side name.
    Upload {
        file_name: Option<String>,
        data: Bytes,
    },
    /// An image to download.
    Url(Url),
}

impl ImageSource {
    /// Returns where the image came from.
    pub fn origin(&self) -> SourceOrigin {
        match self {
            Self::Upload { .. } => SourceOrigin::Upload,
            Self::Url(_) => SourceOrigin::Url,
        }
    }
}

/// Failure to turn an [`ImageSource`] into a local file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The image is larger than the configured limit.
    #[error("image exceeds the maximum size of {limit} bytes")]
    TooLarge { limit: usize },

    /// The URL does not use `http` or `https`.
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    /// The download failed before a response arrived or while reading it.
    #[error("failed to fetch image from {url}")]
    Fetch {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// The remote server answered with a non-success status.
    #[error("fetching image from {url} returned {status}")]
    FetchStatus { url: Url, status: StatusCode },

    /// Writing the temporary file failed.
    #[error("failed to store image: {0}")]
    Io(#[from] io::Error),
}

/// Writes image sources to temporary files in the uploads directory.
///
/// Cheap to clone; clones share the HTTP client used for URL sources.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: Arc<PathBuf>,
    max_file_size: usize,
    http: reqwest::Client,
}

impl UploadStore {
    /// Creates the uploads directory if needed and returns a store over it.
    pub async fn open(config: &ServiceConfig) -> Result<Self> {
        let dir = config.uploads_dir.clone();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| Error::UploadsDir {
                path: dir.clone(),
                source,
            })?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("ocular/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::HttpClient)?;

        tracing::debug!(
            target: TRACING_TARGET,
            dir = %dir.display(),
            max_file_size = config.max_file_size,
            "Uploads directory ready"
        );

        Ok(Self {
            dir: Arc::new(dir),
            max_file_size: config.max_file_size,
            http,
        })
    }

    /// Returns the uploads directory.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the maximum accepted image size in bytes.
    #[inline]
    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Writes `source` to a new temporary file.
    ///
    /// Uploads keep the extension of their file name. URL sources keep the
    /// extension of the last path segment or get `.jpg`.
    pub async fn materialize(
        &self,
        source: ImageSource,
    ) -> Result<MaterializedImage, UploadError> {
        let origin = source.origin();
        let (data, suffix) = match source {
            ImageSource::Upload { file_name, data } => {
                self.check_size(data.len())?;
                let suffix = file_name
                    .as_deref()
                    .and_then(|name| extension_suffix(Path::new(name)))
                    .unwrap_or_default();
                (data, suffix)
            }
            ImageSource::Url(url) => {
                let suffix = url_suffix(&url);
                (self.fetch(&url).await?, suffix)
            }
        };

        let path = tempfile::Builder::new()
            .prefix("ocular-")
            .suffix(&suffix)
            .tempfile_in(self.dir.as_path())?
            .into_temp_path();
        tokio::fs::write(&path, &data).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            origin = %origin,
            path = %path.display(),
            size = data.len(),
            "Image materialized"
        );

        Ok(MaterializedImage {
            path,
            size: data.len() as u64,
            origin,
        })
    }

    /// Downloads `url`, enforcing the size limit while streaming.
    async fn fetch(&self, url: &Url) -> Result<Bytes, UploadError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UploadError::UnsupportedScheme(url.scheme().to_string()));
        }

        let fetch_error = |source| UploadError::Fetch {
            url: url.clone(),
            source,
        };

        let mut response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::FetchStatus {
                url: url.clone(),
                status,
            });
        }

        if let Some(length) = response.content_length() {
            self.check_size(usize::try_from(length).unwrap_or(usize::MAX))?;
        }

        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(fetch_error)? {
            self.check_size(data.len() + chunk.len())?;
            data.extend_from_slice(&chunk);
        }

        Ok(Bytes::from(data))
    }

    fn check_size(&self, size: usize) -> Result<(), UploadError> {
        if size > self.max_file_size {
            return Err(UploadError::TooLarge {
                limit: self.max_file_size,
            });
        }

        Ok(())
    }
}

/// An image written to a temporary file.
///
/// The file is deleted by [`MaterializedImage::cleanup`] or, failing that,
/// when the value is dropped.
#[derive(Debug)]
#[must_use = "the temporary file is deleted when this is dropped"]
pub struct MaterializedImage {
    path: TempPath,
    size: u64,
    origin: SourceOrigin,
}

impl MaterializedImage {
    /// Returns the path of the temporary file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of bytes written.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns where the image came from.
    #[inline]
    pub fn origin(&self) -> SourceOrigin {
        self.origin
    }

    /// Deletes the temporary file, logging a failure instead of returning it.
    pub fn cleanup(self) {
        let path = self.path.display().to_string();
        if let Err(error) = self.path.close() {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path,
                error = %error,
                "Failed to remove temporary image"
            );
        }
    }
}

/// Returns `.ext` for a short alphanumeric extension of `path`.
fn extension_suffix(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    let valid = !extension.is_empty()
        && extension.len() <= 8
        && extension.chars().all(|c| c.is_ascii_alphanumeric());

    valid.then(|| format!(".{extension}"))
}

/// Returns the suffix for a downloaded image.
fn url_suffix(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| extension_suffix(Path::new(segment)))
        .unwrap_or_else(|| FALLBACK_URL_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::StatusCode as HttpStatus;
    use axum::routing::get;
    use tempfile::TempDir;

    use super::*;

    async fn store(dir: &TempDir, max_file_size: usize) -> UploadStore {
        let config = ServiceConfig::default()
            .with_uploads_dir(dir.path().join("uploads"))
            .with_max_file_size(max_file_size);
        UploadStore::open(&config).await.unwrap()
    }

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    #[test]
    fn suffixes() {
        assert_eq!(extension_suffix(Path::new("scan.PNG")).as_deref(), Some(".PNG"));
        assert_eq!(extension_suffix(Path::new("noext")), None);
        assert_eq!(extension_suffix(Path::new("a.p n g")), None);

        let url = Url::parse("https://cdn.test/images/receipt.jpeg?size=large").unwrap();
        assert_eq!(url_suffix(&url), ".jpeg");
        let url = Url::parse("https://cdn.test/render").unwrap();
        assert_eq!(url_suffix(&url), ".jpg");
        let url = Url::parse("https://cdn.test/").unwrap();
        assert_eq!(url_suffix(&url), ".jpg");
    }

    #[tokio::test]
    async fn open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 1024).await;
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn upload_keeps_extension_and_is_removed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 1024).await;

        let image = store
            .materialize(ImageSource::Upload {
                file_name: Some("receipt.png".to_string()),
                data: Bytes::from_static(b"\x89PNG"),
            })
            .await
            .unwrap();

        let path = image.path().to_path_buf();
        assert_eq!(path.extension().unwrap(), "png");
        assert!(path.starts_with(store.dir()));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");
        assert_eq!(image.size(), 4);
        assert_eq!(image.origin(), SourceOrigin::Upload);

        image.cleanup();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn dropped_image_is_removed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 1024).await;

        let image = store
            .materialize(ImageSource::Upload {
                file_name: None,
                data: Bytes::from_static(b"data"),
            })
            .await
            .unwrap();
        let path = image.path().to_path_buf();

        drop(image);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn cleanup_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 1024).await;

        let image = store
            .materialize(ImageSource::Upload {
                file_name: Some("scan.jpg".to_string()),
                data: Bytes::from_static(b"\xff\xd8\xff"),
            })
            .await
            .unwrap();
        let path = image.path().to_path_buf();
        std::fs::remove_file(&path).unwrap();

        image.cleanup();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 3).await;

        let error = store
            .materialize(ImageSource::Upload {
                file_name: Some("big.jpg".to_string()),
                data: Bytes::from_static(b"four"),
            })
            .await
            .unwrap_err();

        assert!(matches!(error, UploadError::TooLarge { limit: 3 }));
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn url_is_downloaded_with_fallback_extension() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 1024).await;
        let base = serve(Router::new().route("/image", get(|| async { "jpeg bytes" }))).await;

        let image = store
            .materialize(ImageSource::Url(base.join("/image").unwrap()))
            .await
            .unwrap();

        assert_eq!(image.path().extension().unwrap(), "jpg");
        assert_eq!(image.size(), 10);
        assert_eq!(image.origin(), SourceOrigin::Url);
        image.cleanup();
    }

    #[tokio::test]
    async fn failed_download_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 1024).await;
        let base = serve(Router::new().route(
            "/missing.png",
            get(|| async { HttpStatus::NOT_FOUND }),
        ))
        .await;

        let error = store
            .materialize(ImageSource::Url(base.join("/missing.png").unwrap()))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            UploadError::FetchStatus { status, .. } if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn oversized_download_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 4).await;
        let base = serve(Router::new().route("/big.png", get(|| async { "way too many bytes" }))).await;

        let error = store
            .materialize(ImageSource::Url(base.join("/big.png").unwrap()))
            .await
            .unwrap_err();

        assert!(matches!(error, UploadError::TooLarge { limit: 4 }));
    }

    #[tokio::test]
    async fn non_http_url_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, 1024).await;

        let error = store
            .materialize(ImageSource::Url(Url::parse("file:///etc/passwd").unwrap()))
            .await
            .unwrap_err();

        assert!(matches!(error, UploadError::UnsupportedScheme(_)));
    }
}
