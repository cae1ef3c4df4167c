use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use ocular_core::ProbeConfig;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    use std::path::PathBuf;

    /// Default directory for temporary image files.
    pub fn uploads_dir() -> PathBuf {
        "uploads".into()
    }

    /// Default maximum image size: 20 MiB.
    pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

    pub fn max_file_size() -> usize {
        MAX_FILE_SIZE
    }
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Directory where uploaded and downloaded images are stored while processed.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "UPLOADS_DIR", default_value = "uploads")
    )]
    #[serde(default = "defaults::uploads_dir")]
    pub uploads_dir: PathBuf,

    /// Maximum size in bytes of an uploaded or downloaded image.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_FILE_SIZE", default_value_t = defaults::MAX_FILE_SIZE)
    )]
    #[serde(default = "defaults::max_file_size")]
    pub max_file_size: usize,

    /// Liveness probe run before each recognition.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            uploads_dir: defaults::uploads_dir(),
            max_file_size: defaults::MAX_FILE_SIZE,
            probe: ProbeConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Sets the uploads directory.
    pub fn with_uploads_dir(mut self, uploads_dir: impl Into<PathBuf>) -> Self {
        self.uploads_dir = uploads_dir.into();
        self
    }

    /// Sets the maximum image size in bytes.
    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Sets the liveness probe configuration.
    pub fn with_probe(mut self, probe: ProbeConfig) -> Self {
        self.probe = probe;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(Error::invalid_config("max file size must be greater than 0"));
        }

        if self.uploads_dir.as_os_str().is_empty() {
            return Err(Error::invalid_config("uploads directory must not be empty"));
        }

        Ok(())
    }
}
