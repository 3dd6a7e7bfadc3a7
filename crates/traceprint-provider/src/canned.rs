//! Scriptable in-process adapter used by tests and local demos.

use crate::adapter::ProviderAdapter;
use crate::descriptor::{ProviderCategory, ProviderDescriptor};
use crate::error::{AdapterError, AdapterResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use traceprint_core::{Identifier, IdentifierType, ProviderId};

/// An adapter that returns a scripted outcome instead of calling anything.
///
/// Useful for dispatcher and engine tests: it can succeed with a fixed
/// payload, fail transiently or permanently, fail only for the first N
/// attempts (to exercise retry), delay to trigger timeouts, or present
/// itself as unconfigured. Every fetch attempt is counted.
pub struct CannedAdapter {
    descriptor: ProviderDescriptor,
    payload: serde_json::Value,
    failure: Option<AdapterErrorKind>,
    fail_first_attempts: u32,
    delay: Duration,
    configured: bool,
    invocations: AtomicU32,
}

#[derive(Clone)]
enum AdapterErrorKind {
    Transient(String),
    Permanent(String),
}

impl CannedAdapter {
    /// Create a canned adapter with the given provider ID and a null payload.
    ///
    /// # Panics
    /// Panics if `id` is not a valid provider ID (test helper).
    #[must_use]
    pub fn new(id: &str) -> Self {
        let provider_id = ProviderId::new(id).expect("valid provider id");
        let descriptor = ProviderDescriptor::new(
            provider_id,
            format!("Canned {id}"),
            ProviderCategory::Osint,
            vec![
                IdentifierType::Username,
                IdentifierType::Email,
                IdentifierType::Phone,
                IdentifierType::Ip,
            ],
        );
        Self {
            descriptor,
            payload: serde_json::Value::Null,
            failure: None,
            fail_first_attempts: 0,
            delay: Duration::ZERO,
            configured: true,
            invocations: AtomicU32::new(0),
        }
    }

    /// Replace the descriptor entirely (builder style).
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: ProviderDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Set the payload returned on success (builder style).
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Make every fetch fail with a transient error (builder style).
    #[must_use]
    pub fn failing_transient(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(AdapterErrorKind::Transient(message.into()));
        self
    }

    /// Make every fetch fail with a permanent error (builder style).
    #[must_use]
    pub fn failing_permanent(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(AdapterErrorKind::Permanent(message.into()));
        self
    }

    /// Fail transiently for the first `n` attempts, then succeed (builder style).
    #[must_use]
    pub fn fail_first(mut self, n: u32) -> Self {
        self.fail_first_attempts = n;
        self
    }

    /// Sleep this long inside each fetch (builder style).
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Present the adapter as unconfigured (builder style).
    #[must_use]
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Number of fetch attempts made so far.
    #[must_use]
    pub fn invocations(&self) -> u32 {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for CannedAdapter {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn fetch(&self, _identifier: &Identifier) -> AdapterResult<serde_json::Value> {
        let attempt = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if attempt <= self.fail_first_attempts {
            return Err(AdapterError::transient(format!(
                "scripted failure on attempt {attempt}"
            )));
        }

        match &self.failure {
            Some(AdapterErrorKind::Transient(msg)) => Err(AdapterError::transient(msg.clone())),
            Some(AdapterErrorKind::Permanent(msg)) => Err(AdapterError::permanent(msg.clone())),
            None => Ok(self.payload.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Identifier {
        Identifier::new(IdentifierType::Email, "jane@example.com").expect("valid email")
    }

    #[tokio::test]
    async fn test_canned_success_counts_invocations() {
        let adapter = CannedAdapter::new("maigret").with_payload(serde_json::json!({"hits": 3}));
        assert_eq!(adapter.invocations(), 0);
        let payload = adapter.fetch(&email()).await.expect("scripted success");
        assert_eq!(payload["hits"], 3);
        assert_eq!(adapter.invocations(), 1);
    }

    #[tokio::test]
    async fn test_fail_first_then_succeed() {
        let adapter = CannedAdapter::new("maigret")
            .with_payload(serde_json::json!({"ok": true}))
            .fail_first(1);

        let first = adapter.fetch(&email()).await;
        assert!(matches!(first, Err(AdapterError::Transient { .. })));

        let second = adapter.fetch(&email()).await.expect("succeeds after retry");
        assert_eq!(second["ok"], true);
        assert_eq!(adapter.invocations(), 2);
    }
}
