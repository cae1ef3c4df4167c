//! Application state and dependency injection.

mod config;
mod uploads;

use jiff::{SignedDuration, Timestamp};
use ocular_core::{LivenessProbe, Recognizer, SharedBackend};

pub use crate::service::config::ServiceConfig;
pub use crate::service::uploads::{
    ImageSource, MaterializedImage, SourceOrigin, UploadError, UploadStore,
};
pub use crate::{Error, Result};

/// Process start time, used to report uptime.
#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    started_at: Timestamp,
}

impl Uptime {
    /// Starts counting from now.
    pub fn start() -> Self {
        Self {
            started_at: Timestamp::now(),
        }
    }

    /// Returns when counting started.
    #[inline]
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// Returns the elapsed time in whole seconds.
    pub fn elapsed_secs(&self) -> u64 {
        let elapsed: SignedDuration = Timestamp::now().duration_since(self.started_at);
        u64::try_from(elapsed.as_secs()).unwrap_or_default()
    }
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    recognizer: Recognizer,
    probe: LivenessProbe,
    uploads: UploadStore,
    uptime: Uptime,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Prepares the uploads directory; the backend is not contacted.
    pub async fn from_config(config: &ServiceConfig, backend: SharedBackend) -> Result<Self> {
        config.validate()?;

        let service_state = Self {
            recognizer: Recognizer::new(backend),
            probe: LivenessProbe::from(&config.probe),
            uploads: UploadStore::open(config).await?,
            uptime: Uptime::start(),
        };

        Ok(service_state)
    }

    /// Returns the upload store.
    #[inline]
    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(recognizer: Recognizer);
impl_di!(probe: LivenessProbe);
impl_di!(uploads: UploadStore);
impl_di!(uptime: Uptime);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ocular_core::mock::MockBackend;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn from_config_prepares_uploads() {
        let dir = TempDir::new().unwrap();
        let config = ServiceConfig::default().with_uploads_dir(dir.path().join("nested/uploads"));

        let state = ServiceState::from_config(&config, Arc::new(MockBackend::replying("")))
            .await
            .unwrap();

        assert!(state.uploads().dir().is_dir());
        assert_eq!(state.probe.attempts(), 3);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = ServiceConfig::default().with_max_file_size(0);
        let result = ServiceState::from_config(&config, Arc::new(MockBackend::replying(""))).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn uptime_starts_at_zero() {
        assert_eq!(Uptime::start().elapsed_secs(), 0);
    }
}
