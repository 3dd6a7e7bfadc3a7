//! Credit admission and bounded concurrent provider fan-out.

use crate::error::{Result, ScanError};
use crate::session::ScanRequest;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use traceprint_core::{DispatchConfig, FetchStatus, Identifier, RawProviderResult};
use traceprint_provider::{CreditLedger, DebitOutcome, ProviderAdapter, ProviderRegistry};

/// Fans a scan request out to its providers.
///
/// The dispatcher owns the timeout/retry/skip semantics: each provider
/// gets a per-attempt timeout, transient errors get exactly one retry
/// after a backoff, unconfigured or incapable providers are skipped
/// without cost, and a global deadline bounds the whole session. A
/// provider that already returned is never re-invoked.
pub struct Dispatcher {
    registry: ProviderRegistry,
    ledger: Arc<dyn CreditLedger>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub fn new(
        registry: ProviderRegistry,
        ledger: Arc<dyn CreditLedger>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            ledger,
            config,
        }
    }

    /// Admit a request: compute the billable cost and debit it once.
    ///
    /// The debit is all-or-nothing; on `InsufficientCredits` nothing has
    /// been charged and no provider has run. Unconfigured, unregistered,
    /// and incapable providers are excluded from the cost because they
    /// will be skipped, not invoked.
    pub async fn admit(&self, request: &ScanRequest) -> Result<u32> {
        let cost = self
            .registry
            .billable_cost(&request.providers, request.identifier.kind());

        match self.ledger.debit(&request.workspace, cost).await {
            DebitOutcome::Accepted { remaining } => {
                tracing::debug!(
                    workspace = %request.workspace,
                    cost,
                    remaining,
                    "scan admitted"
                );
                Ok(cost)
            }
            DebitOutcome::InsufficientFunds {
                available,
                required,
            } => Err(ScanError::InsufficientCredits {
                available,
                required,
            }),
        }
    }

    /// Run the fan-out and wait for every provider to reach a terminal
    /// state. Always returns one `RawProviderResult` per requested
    /// provider, in no particular order.
    pub async fn fan_out(
        &self,
        request: &ScanRequest,
        cancel: &CancellationToken,
    ) -> Vec<RawProviderResult> {
        let deadline = Instant::now()
            + Duration::from_secs(self.config.session_timeout_secs);
        let max_concurrent = self.config.max_concurrent_providers as usize;

        let mut futures = FuturesUnordered::new();
        let mut results = Vec::with_capacity(request.providers.len());

        for provider_id in &request.providers {
            let adapter = match self.registry.get(provider_id) {
                Ok(adapter) => adapter,
                Err(_) => {
                    results.push(RawProviderResult::skipped(
                        provider_id.clone(),
                        "provider not registered",
                    ));
                    continue;
                }
            };
            if !adapter.descriptor().accepts(request.identifier.kind()) {
                results.push(RawProviderResult::skipped(
                    provider_id.clone(),
                    format!(
                        "provider does not accept {} identifiers",
                        request.identifier.kind()
                    ),
                ));
                continue;
            }

            futures.push(self.scan_one(adapter, request.identifier.clone(), cancel, deadline));

            // Respect concurrency limit
            while futures.len() >= max_concurrent {
                if let Some(result) = futures.next().await {
                    results.push(result);
                }
            }
        }

        while let Some(result) = futures.next().await {
            results.push(result);
        }

        results
    }

    /// Invoke one provider under the session deadline, cancellation, and
    /// the retry-once policy.
    async fn scan_one(
        &self,
        adapter: Arc<dyn ProviderAdapter>,
        identifier: Identifier,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> RawProviderResult {
        let provider = adapter.descriptor().id.clone();

        if cancel.is_cancelled() {
            return RawProviderResult::skipped(provider, "session cancelled");
        }

        tokio::select! {
            () = cancel.cancelled() => {
                RawProviderResult::skipped(provider, "session cancelled")
            }
            result = self.invoke_with_retry(adapter, &identifier, deadline) => result,
        }
    }

    async fn invoke_with_retry(
        &self,
        adapter: Arc<dyn ProviderAdapter>,
        identifier: &Identifier,
        deadline: Instant,
    ) -> RawProviderResult {
        let provider = adapter.descriptor().id.clone();
        let provider_timeout = Duration::from_secs(self.config.provider_timeout_secs);

        let Some(timeout) = attempt_budget(provider_timeout, deadline) else {
            return RawProviderResult::skipped(provider, "session deadline exhausted");
        };

        let first = adapter.invoke(identifier, timeout).await;
        let retryable = first.status == FetchStatus::Error
            && first.error.as_ref().is_some_and(|e| e.transient);
        if !retryable {
            return first;
        }

        let backoff = Duration::from_millis(self.config.retry_backoff_ms);
        if Instant::now() + backoff >= deadline {
            return first;
        }
        tracing::debug!(provider = %provider, backoff_ms = self.config.retry_backoff_ms,
            "retrying transient provider failure");
        tokio::time::sleep(backoff).await;

        let Some(timeout) = attempt_budget(provider_timeout, deadline) else {
            return first;
        };
        adapter.invoke(identifier, timeout).await
    }
}

/// Time available for one attempt: the per-provider timeout, shortened by
/// the session deadline. `None` when the deadline has already passed.
fn attempt_budget(provider_timeout: Duration, deadline: Instant) -> Option<Duration> {
    let remaining = deadline.checked_duration_since(Instant::now())?;
    if remaining.is_zero() {
        return None;
    }
    Some(provider_timeout.min(remaining))
}

#[cfg(test)]
mod tests {
    use super::*;
    use traceprint_core::{IdentifierType, ProviderId, WorkspaceId};
    use traceprint_provider::{
        CannedAdapter, InMemoryLedger, ProviderCategory, ProviderDescriptor,
    };

    fn workspace() -> WorkspaceId {
        WorkspaceId::new("acme").expect("valid workspace")
    }

    fn request(providers: Vec<&str>) -> ScanRequest {
        ScanRequest::new(
            Identifier::new(IdentifierType::Email, "jane@example.com").expect("valid email"),
            providers
                .into_iter()
                .map(|p| ProviderId::new(p).expect("valid id"))
                .collect(),
            workspace(),
            "test",
        )
    }

    fn paid_email_descriptor(id: &str, cost: u32) -> ProviderDescriptor {
        ProviderDescriptor::new(
            ProviderId::new(id).expect("valid id"),
            format!("Test {id}"),
            ProviderCategory::Risk,
            vec![IdentifierType::Email],
        )
        .with_credit_cost(cost)
    }

    fn fast_config() -> DispatchConfig {
        DispatchConfig {
            max_concurrent_providers: 5,
            provider_timeout_secs: 1,
            session_timeout_secs: 10,
            retry_backoff_ms: 10,
        }
    }

    fn dispatcher(registry: ProviderRegistry, ledger: InMemoryLedger) -> Dispatcher {
        Dispatcher::new(registry, Arc::new(ledger), fast_config())
    }

    #[tokio::test]
    async fn test_admit_debits_billable_cost_only() {
        let registry = ProviderRegistry::new();
        registry
            .register(Arc::new(
                CannedAdapter::new("ipqs_email")
                    .with_descriptor(paid_email_descriptor("ipqs_email", 2)),
            ))
            .expect("register");
        registry
            .register(Arc::new(
                CannedAdapter::new("abstract-email")
                    .with_descriptor(paid_email_descriptor("abstract-email", 3))
                    .unconfigured(),
            ))
            .expect("register");

        let ledger = InMemoryLedger::new().with_balance(workspace(), 2);
        let d = dispatcher(registry, ledger.clone());

        // Unconfigured provider costs nothing; only the 2-credit one bills
        let charged = d
            .admit(&request(vec!["ipqs_email", "abstract-email"]))
            .await
            .expect("admit");
        assert_eq!(charged, 2);
        assert_eq!(ledger.balance(&workspace()).await, 0);
    }

    #[tokio::test]
    async fn test_admit_insufficient_credits_charges_nothing() {
        let registry = ProviderRegistry::new();
        registry
            .register(Arc::new(
                CannedAdapter::new("ipqs_email")
                    .with_descriptor(paid_email_descriptor("ipqs_email", 5)),
            ))
            .expect("register");

        let ledger = InMemoryLedger::new().with_balance(workspace(), 3);
        let d = dispatcher(registry, ledger.clone());

        let err = d
            .admit(&request(vec!["ipqs_email"]))
            .await
            .expect_err("should refuse");
        assert!(matches!(
            err,
            ScanError::InsufficientCredits {
                available: 3,
                required: 5
            }
        ));
        assert_eq!(ledger.balance(&workspace()).await, 3);
    }

    #[tokio::test]
    async fn test_fan_out_timeout_does_not_block_siblings() {
        let registry = ProviderRegistry::new();
        registry
            .register(Arc::new(
                CannedAdapter::new("slowpoke").with_delay(Duration::from_secs(5)),
            ))
            .expect("register");
        registry
            .register(Arc::new(
                CannedAdapter::new("speedy").with_payload(serde_json::json!({"ok": true})),
            ))
            .expect("register");

        let d = dispatcher(registry.clone(), InMemoryLedger::new());
        let cancel = CancellationToken::new();
        let results = d
            .fan_out(&request(vec!["slowpoke", "speedy"]), &cancel)
            .await;

        assert_eq!(results.len(), 2);
        let by_id = |id: &str| {
            results
                .iter()
                .find(|r| r.provider.as_str() == id)
                .expect("result present")
        };
        assert_eq!(by_id("speedy").status, FetchStatus::Ok);
        assert_eq!(by_id("slowpoke").status, FetchStatus::Timeout);
    }

    #[tokio::test]
    async fn test_transient_error_retried_once() {
        let adapter = Arc::new(
            CannedAdapter::new("flaky")
                .with_payload(serde_json::json!({"ok": true}))
                .fail_first(1),
        );
        let registry = ProviderRegistry::new();
        registry.register(adapter.clone()).expect("register");

        let d = dispatcher(registry.clone(), InMemoryLedger::new());
        let results = d
            .fan_out(&request(vec!["flaky"]), &CancellationToken::new())
            .await;

        assert_eq!(results[0].status, FetchStatus::Ok);
        assert_eq!(adapter.invocations(), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let adapter = Arc::new(CannedAdapter::new("broken").failing_permanent("bad request"));
        let registry = ProviderRegistry::new();
        registry.register(adapter.clone()).expect("register");

        let d = dispatcher(registry.clone(), InMemoryLedger::new());
        let results = d
            .fan_out(&request(vec!["broken"]), &CancellationToken::new())
            .await;

        assert_eq!(results[0].status, FetchStatus::Error);
        assert_eq!(adapter.invocations(), 1);
    }

    #[tokio::test]
    async fn test_persistent_transient_error_stops_after_retry() {
        let adapter = Arc::new(CannedAdapter::new("limited").failing_transient("rate limited"));
        let registry = ProviderRegistry::new();
        registry.register(adapter.clone()).expect("register");

        let d = dispatcher(registry.clone(), InMemoryLedger::new());
        let results = d
            .fan_out(&request(vec!["limited"]), &CancellationToken::new())
            .await;

        assert_eq!(results[0].status, FetchStatus::Error);
        // One attempt plus exactly one retry
        assert_eq!(adapter.invocations(), 2);
    }

    #[tokio::test]
    async fn test_unregistered_and_incapable_are_skipped() {
        let registry = ProviderRegistry::new();
        registry
            .register(Arc::new(
                CannedAdapter::new("phone-only").with_descriptor(
                    ProviderDescriptor::new(
                        ProviderId::new("phone-only").expect("valid id"),
                        "Phone Only",
                        ProviderCategory::Carrier,
                        vec![IdentifierType::Phone],
                    ),
                ),
            ))
            .expect("register");

        let d = dispatcher(registry.clone(), InMemoryLedger::new());
        let results = d
            .fan_out(&request(vec!["phone-only", "ghost"]), &CancellationToken::new())
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == FetchStatus::Skipped));
    }

    #[tokio::test]
    async fn test_cancellation_skips_pending_providers() {
        let registry = ProviderRegistry::new();
        registry
            .register(Arc::new(
                CannedAdapter::new("slowpoke").with_delay(Duration::from_secs(5)),
            ))
            .expect("register");

        let d = dispatcher(registry.clone(), InMemoryLedger::new());
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel_clone.cancel();
        });

        let started = std::time::Instant::now();
        let results = d.fan_out(&request(vec!["slowpoke"]), &cancel).await;
        assert_eq!(results[0].status, FetchStatus::Skipped);
        // Cancellation cut the wait well short of the 1s provider timeout
        assert!(started.elapsed() < Duration::from_millis(900));
    }
}
