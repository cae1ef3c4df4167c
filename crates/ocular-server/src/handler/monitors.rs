//! Liveness and backend health handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use jiff::Timestamp;
use ocular_core::Recognizer;

use crate::extract::Json;
use crate::handler::response::{BackendHealth, PingStatus, ServerStatus};
use crate::service::{ServiceState, Uptime};

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "ocular_server::handler::monitors";

async fn server_status() -> Json<ServerStatus> {
    Json(ServerStatus {
        status: "Server is running".to_string(),
    })
}

async fn ping(State(uptime): State<Uptime>) -> Json<PingStatus> {
    Json(PingStatus {
        status: "alive".to_string(),
        time: Timestamp::now(),
        uptime_secs: uptime.elapsed_secs(),
    })
}

/// Checks the model backend once, without the liveness probe retries.
#[tracing::instrument(skip_all)]
async fn health(State(recognizer): State<Recognizer>) -> (StatusCode, Json<BackendHealth>) {
    let backend = recognizer.backend();
    let result = backend.health_check().await;

    if let Err(err) = &result {
        tracing::warn!(
            target: TRACING_TARGET,
            error = %err,
            endpoint = %backend.endpoint(),
            "Model backend health check failed"
        );
    }

    let is_healthy = result.is_ok();
    let (status_code, status) = if is_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    let response = BackendHealth {
        status: status.to_string(),
        backend: backend.endpoint(),
        is_healthy,
        timestamp: Timestamp::now(),
    };

    (status_code, Json(response))
}

/// Returns a [`Router`] with all monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/", get(server_status))
        .route("/ping", get(ping))
        .route("/health", get(health))
}
