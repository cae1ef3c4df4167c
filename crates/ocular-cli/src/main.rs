#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use axum::Router;
use ocular_core::{LivenessProbe, PromptPreset, RecognitionRequest, Recognizer, SharedBackend};
use ocular_server::handler::routes;
use ocular_server::middleware::{RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt};
use ocular_server::service::ServiceState;

use crate::config::{Cli, Command, MiddlewareConfig, create_backend};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "ocular_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "ocular_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "ocular_cli::config";
pub const TRACING_TARGET_RECOGNIZE: &str = "ocular_cli::recognize";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if let Some(server_error) = error.downcast_ref::<server::ServerError>() {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %server_error,
            error_code = server_error.error_code(),
            recoverable = server_error.is_recoverable(),
            suggestion = server_error.suggestion().unwrap_or_default(),
            "Server terminated with error"
        );
    }

    match error.downcast_ref::<ocular_core::Error>() {
        Some(recognition_error) => {
            eprintln!("{}: {}", recognition_error.code(), recognition_error.message());
        }
        None => eprintln!("Error: {error:#}"),
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let backend = create_backend(&cli.ollama)?;

    match cli.selected_command() {
        Command::Serve => serve(cli, backend).await,
        Command::Recognize {
            path,
            model,
            prompt,
            markdown,
        } => {
            let prompt = match (prompt, markdown) {
                (_, true) => Some(PromptPreset::Markdown.instruction().to_string()),
                (Some(prompt), false) => Some(PromptPreset::resolve(&prompt)),
                (None, false) => None,
            };
            let probe = LivenessProbe::from(&cli.service.probe);
            let text = recognize(backend, probe, path, model, prompt).await?;
            println!("{text}");
            Ok(())
        }
    }
}

/// Runs the HTTP server until shutdown.
async fn serve(cli: Cli, backend: SharedBackend) -> anyhow::Result<()> {
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "Starting ocular server"
    );

    let state = ServiceState::from_config(&cli.service, backend)
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;
    Ok(())
}

/// Recognizes one image and returns its text.
async fn recognize(
    backend: SharedBackend,
    probe: LivenessProbe,
    path: PathBuf,
    model: Option<String>,
    prompt: Option<String>,
) -> anyhow::Result<String> {
    if !probe.wait(backend.as_ref()).await {
        tracing::warn!(
            target: TRACING_TARGET_RECOGNIZE,
            endpoint = %backend.endpoint(),
            attempts = probe.attempts(),
            "Model backend did not answer the liveness probe, trying anyway"
        );
    }

    let mut request = RecognitionRequest::new(path);
    if let Some(model) = model {
        request = request.with_model(model);
    }
    if let Some(prompt) = prompt {
        request = request.with_system_prompt(prompt);
    }

    let text = Recognizer::new(backend).recognize(&request).await?;
    Ok(text)
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS, security headers, body limits
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_state(state)
        .with_security(&middleware.security)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
