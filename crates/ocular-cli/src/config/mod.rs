//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── command: Command             # serve (default) or recognize
//! ├── server: ServerConfig         # Host, port, shutdown
//! ├── middleware: MiddlewareConfig # CORS, body limit, request timeout
//! ├── service: ServiceConfig       # Uploads, liveness probe
//! └── ollama: OllamaConfig         # Model server address
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! ```bash
//! ocular --port 8080 --ollama-host http://gpu-box:11434
//! OLLAMA_HOST=http://gpu-box:11434 ocular recognize receipt.png --markdown
//! ```

mod middleware;
mod provider;
mod server;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
pub use middleware::MiddlewareConfig;
use ocular_ollama::OllamaConfig;
use ocular_server::service::ServiceConfig;
pub use provider::create_backend;
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "ocular")]
#[command(about = "Image text recognition backed by a local vision model")]
#[command(version)]
pub struct Cli {
    /// Command to run; defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, body limit, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Uploads and liveness probe configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Ollama server configuration.
    #[clap(flatten)]
    pub ollama: OllamaConfig,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Runs the HTTP server.
    Serve,

    /// Recognizes the text of one image and prints it.
    Recognize {
        /// Path of the image file.
        path: PathBuf,

        /// Model identifier, e.g. "llava:13b".
        #[arg(long)]
        model: Option<String>,

        /// Preset name ("ocr", "markdown") or literal instruction text.
        #[arg(long, conflicts_with = "markdown")]
        prompt: Option<String>,

        /// Uses the Markdown transcription preset.
        #[arg(long)]
        markdown: bool,
    },
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so `recognize` output stays clean on stdout.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Returns the command to run.
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;

        if self.middleware.recovery.request_timeout == 0 {
            return Err(anyhow!("Request timeout must be greater than 0 seconds"));
        }

        if self.middleware.security.max_body_size < self.service.max_file_size {
            return Err(anyhow!(
                "Max body size {} is smaller than max file size {}",
                self.middleware.security.max_body_size,
                self.service.max_file_size
            ));
        }

        self.service
            .validate()
            .context("invalid service configuration")?;

        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            uploads_dir = %self.service.uploads_dir.display(),
            max_file_size = self.service.max_file_size,
            probe_attempts = self.service.probe.probe_attempts,
            probe_delay_secs = self.service.probe.probe_delay,
            "Service configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            ollama_host = %self.ollama.ollama_host,
            "Ollama configuration"
        );
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
