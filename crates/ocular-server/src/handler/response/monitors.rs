use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
}

/// Body of `GET /ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingStatus {
    pub status: String,
    pub time: Timestamp,
    pub uptime_secs: u64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendHealth {
    /// `ok` or `unavailable`.
    pub status: String,
    /// Printable address of the model backend.
    pub backend: String,
    pub is_healthy: bool,
    pub timestamp: Timestamp,
}
