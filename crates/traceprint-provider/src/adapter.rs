//! The provider adapter trait and its never-panicking invoke path.

use crate::descriptor::ProviderDescriptor;
use crate::error::{AdapterError, AdapterResult};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use traceprint_core::{FailureDetail, Identifier, RawProviderResult};

/// Trait for scanning provider adapters.
///
/// Implementations perform one lookup against an external service and
/// return the service's native JSON payload. Adapters must be thread-safe
/// (Send + Sync) because the dispatcher fans them out concurrently.
///
/// Callers should use [`ProviderAdapter::invoke`] rather than `fetch`
/// directly: invoke enforces the per-attempt timeout and converts every
/// outcome, success or failure, into a [`RawProviderResult`].
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Static metadata for this provider.
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Whether the adapter has everything it needs to run (keys, endpoints).
    fn is_configured(&self) -> bool;

    /// Perform one lookup attempt.
    ///
    /// # Errors
    /// Returns error if the provider is unconfigured, unreachable, or
    /// responds with a failure.
    async fn fetch(&self, identifier: &Identifier) -> AdapterResult<serde_json::Value>;

    /// Run one timed attempt and fold the outcome into a `RawProviderResult`.
    ///
    /// This never returns an error: timeouts, adapter failures, and missing
    /// configuration all become terminal statuses on the result.
    async fn invoke(&self, identifier: &Identifier, timeout: Duration) -> RawProviderResult {
        let provider = self.descriptor().id.clone();

        if !self.is_configured() {
            tracing::debug!(provider = %provider, "skipping unconfigured provider");
            return RawProviderResult::skipped(provider, "provider not configured");
        }

        let started = Instant::now();
        match tokio::time::timeout(timeout, self.fetch(identifier)).await {
            Ok(Ok(payload)) => {
                let latency = started.elapsed();
                tracing::debug!(
                    provider = %provider,
                    latency_ms = latency.as_millis() as u64,
                    "provider returned payload"
                );
                RawProviderResult::ok(provider, payload, latency)
            }
            Ok(Err(AdapterError::NotConfigured { reason })) => {
                tracing::debug!(provider = %provider, %reason, "provider reported unconfigured");
                RawProviderResult::skipped(provider, reason)
            }
            Ok(Err(err)) => {
                let latency = started.elapsed();
                let detail = match &err {
                    AdapterError::Transient { message } => FailureDetail::transient(message),
                    AdapterError::Permanent { message } => FailureDetail::permanent(message),
                    AdapterError::NotConfigured { .. } => unreachable!("handled above"),
                };
                tracing::warn!(
                    provider = %provider,
                    transient = detail.transient,
                    error = %detail.message,
                    "provider invocation failed"
                );
                RawProviderResult::error(provider, detail, latency)
            }
            Err(_elapsed) => {
                tracing::warn!(
                    provider = %provider,
                    timeout_ms = timeout.as_millis() as u64,
                    "provider invocation timed out"
                );
                RawProviderResult::timeout(provider, started.elapsed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canned::CannedAdapter;
    use traceprint_core::{FetchStatus, IdentifierType};

    fn email() -> Identifier {
        Identifier::new(IdentifierType::Email, "jane@example.com").expect("valid email")
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let adapter = CannedAdapter::new("hibp").with_payload(serde_json::json!({"breaches": 2}));
        let result = adapter.invoke(&email(), Duration::from_secs(1)).await;
        assert_eq!(result.status, FetchStatus::Ok);
        assert!(result.payload.is_some());
    }

    #[tokio::test]
    async fn test_invoke_unconfigured_becomes_skip() {
        let adapter = CannedAdapter::new("hibp").unconfigured();
        let result = adapter.invoke(&email(), Duration::from_secs(1)).await;
        assert_eq!(result.status, FetchStatus::Skipped);
        assert!(result.payload.is_none());
    }

    #[tokio::test]
    async fn test_invoke_timeout() {
        let adapter = CannedAdapter::new("hibp")
            .with_payload(serde_json::json!({}))
            .with_delay(Duration::from_millis(200));
        let result = adapter.invoke(&email(), Duration::from_millis(10)).await;
        assert_eq!(result.status, FetchStatus::Timeout);
        assert!(result.error.as_ref().is_some_and(|e| e.transient));
    }

    #[tokio::test]
    async fn test_invoke_failure_carries_transience() {
        let adapter = CannedAdapter::new("hibp").failing_transient("rate limited");
        let result = adapter.invoke(&email(), Duration::from_secs(1)).await;
        assert_eq!(result.status, FetchStatus::Error);
        assert!(result.error.as_ref().is_some_and(|e| e.transient));

        let adapter = CannedAdapter::new("hibp").failing_permanent("bad request");
        let result = adapter.invoke(&email(), Duration::from_secs(1)).await;
        assert_eq!(result.status, FetchStatus::Error);
        assert!(result.error.as_ref().is_some_and(|e| !e.transient));
    }
}
