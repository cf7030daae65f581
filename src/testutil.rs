//! Test utilities: doubles for the external collaborators.
//!
//! Handwritten mocks for dependency injection in unit and integration tests.
//! They use `Arc<Mutex<_>>` so clones handed to the app share what they record
//! with the copy the test keeps for assertions.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::AppError;
use crate::notifications::{Email, Mailer};
use crate::payments::{IntentRequest, PaymentGateway, PaymentIntent};

/// Locks `mutex`, keeping the recorded data even if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MockGateway
// ---------------------------------------------------------------------------

/// Payment gateway that records every request and answers with a fixed secret.
///
/// `declining(message)` builds one that records the request and then fails with
/// `UpstreamFailure(message)`, like a processor rejecting the call.
#[derive(Clone)]
pub struct MockGateway {
    client_secret: String,
    decline: Option<String>,
    requests: Arc<Mutex<Vec<IntentRequest>>>,
}

impl MockGateway {
    pub fn new(client_secret: &str) -> Self {
        Self {
            client_secret: client_secret.to_string(),
            decline: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn declining(message: &str) -> Self {
        Self {
            decline: Some(message.to_string()),
            ..Self::new("")
        }
    }

    pub fn requests(&self) -> Vec<IntentRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_payment_intent(
        &self,
        request: IntentRequest,
    ) -> Result<PaymentIntent, AppError> {
        lock(&self.requests).push(request);
        if let Some(message) = &self.decline {
            return Err(AppError::UpstreamFailure(message.clone()));
        }
        Ok(PaymentIntent {
            id: "pi_mock".to_string(),
            client_secret: self.client_secret.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingMailer
// ---------------------------------------------------------------------------

/// Mailer that keeps delivered emails in memory.
///
/// `failing_first(n)` makes the first `n` attempts fail with `UpstreamFailure`.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<Email>>>,
    attempts: Arc<AtomicU32>,
    failures: u32,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(failures: u32) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        lock(&self.sent).clone()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Polls until `count` emails were delivered or `timeout` elapses.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Email> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent();
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), AppError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(AppError::UpstreamFailure("relay unavailable".into()));
        }
        lock(&self.sent).push(email.clone());
        Ok(())
    }
}
