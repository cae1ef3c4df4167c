//! Bounded liveness probe for cold-starting backends.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_PROBE;
use crate::backend::ChatBackend;

/// Configuration of the [`LivenessProbe`].
///
/// Setting `probe_attempts` to zero disables the probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ProbeConfig {
    /// Number of health checks before giving up on the model backend.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PROBE_ATTEMPTS", default_value_t = 3)
    )]
    #[serde(default = "default_attempts")]
    pub probe_attempts: u32,

    /// Delay in seconds between failed health checks.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PROBE_DELAY", default_value_t = 10)
    )]
    #[serde(default = "default_delay")]
    pub probe_delay: u64,
}

fn default_attempts() -> u32 {
    3
}

fn default_delay() -> u64 {
    10
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            probe_attempts: default_attempts(),
            probe_delay: default_delay(),
        }
    }
}

impl ProbeConfig {
    /// Returns a configuration with the probe turned off.
    pub fn disabled() -> Self {
        Self {
            probe_attempts: 0,
            probe_delay: 0,
        }
    }

    /// Returns the delay between attempts as a `Duration`.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_secs(self.probe_delay)
    }

    /// Returns whether the probe runs at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.probe_attempts > 0
    }
}

/// Polls a backend until it answers a health check or the attempts run out.
///
/// This is caller-side policy: it runs before a recognition to ride out a
/// model server that is still starting, and never alters the recognizer.
#[derive(Debug, Clone, Copy)]
pub struct LivenessProbe {
    attempts: u32,
    delay: Duration,
}

impl LivenessProbe {
    /// Creates a probe with `attempts` checks spaced by `delay`.
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Returns the configured attempt count.
    #[inline]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Waits for `backend` to become reachable.
    ///
    /// Returns `true` as soon as a health check succeeds, or immediately when
    /// the probe is disabled. Sleeps between failed attempts but not after
    /// the last one.
    pub async fn wait(&self, backend: &dyn ChatBackend) -> bool {
        if self.attempts == 0 {
            return true;
        }

        for attempt in 1..=self.attempts {
            match backend.health_check().await {
                Ok(()) => {
                    tracing::debug!(
                        target: TRACING_TARGET_PROBE,
                        attempt = attempt,
                        endpoint = %backend.endpoint(),
                        "Model backend is reachable"
                    );
                    return true;
                }
                Err(error) => {
                    tracing::info!(
                        target: TRACING_TARGET_PROBE,
                        attempt = attempt,
                        max_attempts = self.attempts,
                        error = %error,
                        "Model backend health check failed"
                    );
                }
            }

            if attempt < self.attempts {
                tokio::time::sleep(self.delay).await;
            }
        }

        tracing::warn!(
            target: TRACING_TARGET_PROBE,
            attempts = self.attempts,
            endpoint = %backend.endpoint(),
            "Model backend did not become reachable"
        );
        false
    }
}

impl From<&ProbeConfig> for LivenessProbe {
    fn from(config: &ProbeConfig) -> Self {
        Self::new(config.probe_attempts, config.delay())
    }
}

impl Default for LivenessProbe {
    fn default() -> Self {
        Self::from(&ProbeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    #[test]
    fn default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.probe_attempts, 3);
        assert_eq!(config.delay(), Duration::from_secs(10));
        assert!(config.is_enabled());
        assert!(!ProbeConfig::disabled().is_enabled());
    }

    #[tokio::test]
    async fn disabled_probe_skips_checks() {
        let backend = MockBackend::replying("").with_failing_health_checks(5);
        let probe = LivenessProbe::from(&ProbeConfig::disabled());

        assert!(probe.wait(&backend).await);
        assert_eq!(backend.health_check_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_cold_start() {
        let backend = MockBackend::replying("").with_failing_health_checks(2);
        let probe = LivenessProbe::new(3, Duration::from_secs(10));

        assert!(probe.wait(&backend).await);
        assert_eq!(backend.health_check_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_attempts() {
        let backend = MockBackend::replying("").with_failing_health_checks(10);
        let probe = LivenessProbe::new(3, Duration::from_secs(10));

        let started = tokio::time::Instant::now();
        assert!(!probe.wait(&backend).await);
        assert_eq!(backend.health_check_count(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }
}
