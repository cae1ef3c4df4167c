//! Shutdown signals and the drain deadline that follows them.

use std::future::{Future, pending};
use std::time::Duration;

use strum::Display;
use tokio::sync::oneshot;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Signal that asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ShutdownSignal {
    Sigint,
    Sigterm,
}

/// Resolves on the first SIGINT (Ctrl+C) or, on Unix, SIGTERM.
///
/// A handler that cannot be installed never resolves, so the server keeps
/// running on the remaining one.
pub async fn shutdown_signal() -> ShutdownSignal {
    let signal = tokio::select! {
        signal = interrupt() => signal,
        signal = terminate() => signal,
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal = %signal,
        "Received shutdown signal, draining in-flight requests"
    );
    signal
}

async fn interrupt() -> ShutdownSignal {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "Failed to listen for Ctrl+C"
        );
        return pending().await;
    }

    ShutdownSignal::Sigint
}

#[cfg(unix)]
async fn terminate() -> ShutdownSignal {
    use tokio::signal::unix::{SignalKind, signal};

    let mut stream = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %error,
                "Failed to install SIGTERM handler"
            );
            return pending().await;
        }
    };

    match stream.recv().await {
        Some(()) => ShutdownSignal::Sigterm,
        None => pending().await,
    }
}

#[cfg(not(unix))]
async fn terminate() -> ShutdownSignal {
    pending().await
}

/// Splits `signal` into the trigger for graceful shutdown and a deadline.
///
/// The trigger resolves with `signal`. The deadline resolves `timeout` after
/// it and stays pending if the trigger is dropped unfired.
pub fn with_deadline<F>(
    signal: F,
    timeout: Duration,
) -> (impl Future<Output = ()> + Send + 'static, impl Future<Output = ()>)
where
    F: Future + Send + 'static,
{
    let (fired_tx, fired_rx) = oneshot::channel::<()>();

    let trigger = async move {
        signal.await;
        let _ = fired_tx.send(());
    };

    let deadline = async move {
        if fired_rx.await.is_err() {
            pending::<()>().await;
        }
        tokio::time::sleep(timeout).await;
    };

    (trigger, deadline)
}
