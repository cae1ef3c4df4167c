//! Ollama connection configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default address of a local Ollama server.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Configuration for the Ollama client.
///
/// Passed explicitly to [`OllamaClient::new`]; the client never reads the
/// environment itself.
///
/// [`OllamaClient::new`]: crate::OllamaClient::new
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OllamaConfig {
    /// Base URL of the Ollama server (e.g., "http://192.168.1.100:11434")
    #[cfg_attr(
        feature = "config",
        arg(long = "ollama-host", env = "OLLAMA_HOST", default_value = DEFAULT_OLLAMA_HOST)
    )]
    #[serde(default = "default_host")]
    pub ollama_host: Url,
}

fn default_host() -> Url {
    Url::parse(DEFAULT_OLLAMA_HOST).expect("default Ollama host is a valid URL")
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_host: default_host(),
        }
    }
}

impl OllamaConfig {
    /// Creates a configuration pointing at `ollama_host`.
    pub fn new(ollama_host: Url) -> Self {
        Self { ollama_host }
    }

    /// Sets the server address.
    pub fn with_host(mut self, ollama_host: Url) -> Self {
        self.ollama_host = ollama_host;
        self
    }

    /// Returns the port, falling back to the scheme default.
    pub fn port(&self) -> Option<u16> {
        self.ollama_host.port_or_known_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_server() {
        let config = OllamaConfig::default();
        assert_eq!(config.ollama_host.as_str(), "http://localhost:11434/");
        assert_eq!(config.port(), Some(11434));
    }

    #[test]
    fn custom_host_keeps_known_default_port() {
        let host = Url::parse("https://ollama.internal").unwrap();
        let config = OllamaConfig::default().with_host(host);
        assert_eq!(config.port(), Some(443));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: OllamaConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.ollama_host.as_str(), "http://localhost:11434/");

        let config: OllamaConfig =
            serde_json::from_str(r#"{"ollama_host":"http://gpu-box:8080"}"#).unwrap();
        assert_eq!(config.port(), Some(8080));
    }
}
