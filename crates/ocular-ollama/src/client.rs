//! Ollama client implementing the recognizer backend.

use std::fmt;

use ocular_core::{BackendResult, ChatBackend};
use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::images::Image;
use url::Url;

use crate::config::OllamaConfig;
use crate::error::{Error, Result};
use crate::TRACING_TARGET_CLIENT;

/// Client for an Ollama server.
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
///
/// # Examples
///
/// ```rust
/// use ocular_ollama::{OllamaClient, OllamaConfig};
///
/// let client = OllamaClient::new(OllamaConfig::default()).expect("valid host");
/// assert_eq!(client.host().as_str(), "http://localhost:11434/");
/// ```
#[derive(Clone)]
pub struct OllamaClient {
    ollama: Ollama,
    host: Url,
}

impl OllamaClient {
    /// Creates a client for the server named in `config`.
    ///
    /// No request is made; use [`ChatBackend::health_check`] to verify the
    /// server is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHost`] if the host is not an `http(s)` URL with
    /// a host name.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let host = config.ollama_host;

        if !matches!(host.scheme(), "http" | "https") {
            return Err(Error::invalid_host(host.as_str(), "scheme must be http or https"));
        }

        if host.host_str().is_none() {
            return Err(Error::invalid_host(host.as_str(), "missing host name"));
        }

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            host = %host,
            "Creating Ollama client"
        );

        Ok(Self {
            ollama: Ollama::from_url(host.clone()),
            host,
        })
    }

    /// Returns the configured server address.
    #[inline]
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Lists the names of models available on the server.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let models = self.ollama.list_local_models().await?;
        Ok(models.into_iter().map(|model| model.name).collect())
    }
}

impl fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaClient")
            .field("host", &self.host.as_str())
            .finish()
    }
}

#[async_trait::async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(&self, model: &str, instruction: &str, image: &str) -> BackendResult<String> {
        let message = ChatMessage::user(instruction.to_string())
            .with_images(vec![Image::from_base64(image)]);
        let request = ChatMessageRequest::new(model.to_string(), vec![message]);

        tracing::trace!(
            target: TRACING_TARGET_CLIENT,
            host = %self.host,
            model = %model,
            "Sending chat request"
        );

        match self.ollama.send_chat_messages(request).await {
            Ok(response) => Ok(response.message.content),
            Err(error) => {
                let error = Error::from(error);
                tracing::debug!(
                    target: TRACING_TARGET_CLIENT,
                    host = %self.host,
                    model = %model,
                    connection_failure = error.is_connection_failure(),
                    error = %error,
                    "Chat request failed"
                );
                Err(error.into())
            }
        }
    }

    async fn health_check(&self) -> BackendResult<()> {
        self.list_models()
            .await
            .map(|models| {
                tracing::trace!(
                    target: TRACING_TARGET_CLIENT,
                    host = %self.host,
                    models = models.len(),
                    "Health check succeeded"
                );
            })
            .map_err(Into::into)
    }

    fn endpoint(&self) -> String {
        self.host.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use ocular_core::LivenessProbe;

    use super::*;

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn closed_port() -> Url {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn client(host: Url) -> OllamaClient {
        OllamaClient::new(OllamaConfig::new(host)).unwrap()
    }

    #[test]
    fn rejects_non_http_hosts() {
        let host = Url::parse("ftp://models.local").unwrap();
        let error = OllamaClient::new(OllamaConfig::new(host)).unwrap_err();
        assert!(matches!(error, Error::InvalidHost { .. }));
    }

    #[tokio::test]
    async fn refused_chat_is_connection_refused() {
        let client = client(closed_port());

        let error = client.chat("llama3.2-vision", "Read.", "aGk=").await.unwrap_err();
        assert!(error.is_connection_refused(), "{error}");
        assert!(error.to_string().contains("error sending request"), "{error}");
    }

    #[tokio::test]
    async fn refused_health_check_is_connection_refused() {
        let client = client(closed_port());

        let error = client.health_check().await.unwrap_err();
        assert!(error.is_connection_refused(), "{error}");
    }

    #[tokio::test]
    async fn server_error_is_not_connection_refused() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
        );
        let client = client(serve(router).await);

        let error = client.chat("llava", "Read.", "aGk=").await.unwrap_err();
        assert!(!error.is_connection_refused(), "{error}");
    }

    #[tokio::test]
    async fn health_check_lists_models() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async { axum::Json(serde_json::json!({ "models": [] })) }),
        );
        let client = client(serve(router).await);

        client.health_check().await.unwrap();
        assert!(client.list_models().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn probe_waits_for_reachable_server() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async { axum::Json(serde_json::json!({ "models": [] })) }),
        );
        let client = client(serve(router).await);

        let probe = LivenessProbe::new(2, Duration::from_millis(10));
        assert!(probe.wait(&client).await);
    }

    #[tokio::test]
    async fn probe_gives_up_on_closed_port() {
        let client = client(closed_port());

        let probe = LivenessProbe::new(2, Duration::from_millis(10));
        assert!(!probe.wait(&client).await);
    }
}
