//! In-memory backend for tests.

use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::backend::{BackendError, BackendResult, ChatBackend};

/// Reply a [`MockBackend`] gives to every chat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Succeed with this content.
    Text(String),
    /// Fail as if the server were down.
    ConnectionRefused,
    /// Fail with a generic backend error carrying this message.
    Failure(String),
}

/// A chat call recorded by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub model: String,
    pub instruction: String,
    pub image: String,
}

/// Backend returning a fixed reply and recording every call.
#[derive(Debug)]
pub struct MockBackend {
    reply: MockReply,
    failing_health_checks: AtomicU32,
    health_checks: AtomicU32,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBackend {
    /// Creates a mock answering every chat call with `reply`.
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            failing_health_checks: AtomicU32::new(0),
            health_checks: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock answering every chat call with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockReply::Text(text.into()))
    }

    /// Makes the first `count` health checks fail with a refused connection.
    #[must_use]
    pub fn with_failing_health_checks(self, count: u32) -> Self {
        self.failing_health_checks.store(count, Ordering::SeqCst);
        self
    }

    /// Returns the number of chat calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }

    /// Returns the most recent chat call.
    pub fn last_call(&self) -> Option<MockCall> {
        self.calls
            .lock()
            .ok()
            .and_then(|calls| calls.last().cloned())
    }

    /// Returns the number of health checks received.
    pub fn health_check_count(&self) -> u32 {
        self.health_checks.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChatBackend for MockBackend {
    async fn chat(&self, model: &str, instruction: &str, image: &str) -> BackendResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                model: model.to_string(),
                instruction: instruction.to_string(),
                image: image.to_string(),
            });
        }

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::ConnectionRefused => Err(BackendError::connection_refused(
                io::Error::from(io::ErrorKind::ConnectionRefused),
            )),
            MockReply::Failure(message) => Err(BackendError::other(message.clone())),
        }
    }

    async fn health_check(&self) -> BackendResult<()> {
        self.health_checks.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failing_health_checks.load(Ordering::SeqCst);
        if remaining == 0 {
            return Ok(());
        }

        self.failing_health_checks
            .store(remaining - 1, Ordering::SeqCst);
        Err(BackendError::connection_refused(io::Error::from(
            io::ErrorKind::ConnectionRefused,
        )))
    }

    fn endpoint(&self) -> String {
        "mock://backend".to_string()
    }
}
