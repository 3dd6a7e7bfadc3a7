//! The canonical finding model and ephemeral raw provider results.
//!
//! Providers return heterogeneous payloads as [`RawProviderResult`]s; the
//! normalization layer converts them into [`Finding`]s, the single shape
//! the rest of the engine consumes. Raw results are ephemeral by contract:
//! they are dropped after normalization and are never persisted or logged
//! wholesale.

use crate::types::{FetchStatus, ProviderId, Severity, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Diagnostic detail attached to a failed provider invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureDetail {
    /// Human-readable failure summary. Must not contain raw identifiers.
    pub message: String,
    /// Whether the failure is worth retrying (rate limits, 5xx, connect errors).
    pub transient: bool,
}

impl FailureDetail {
    /// A transient failure (retryable).
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: true,
        }
    }

    /// A permanent failure (not retryable).
    #[must_use]
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: false,
        }
    }
}

/// The untyped result of a single provider invocation.
///
/// The payload keeps the provider's native JSON shape; only the
/// normalization rules for that provider know how to read it.
#[derive(Debug, Clone)]
pub struct RawProviderResult {
    /// Which provider produced this result
    pub provider: ProviderId,
    /// Terminal status of the invocation
    pub status: FetchStatus,
    /// The provider's native payload, present only when status is `Ok`
    pub payload: Option<serde_json::Value>,
    /// Wall-clock duration of the invocation (including any retry)
    pub latency: Duration,
    /// Failure detail, present for `Timeout` and `Error` statuses
    pub error: Option<FailureDetail>,
}

impl RawProviderResult {
    /// A successful result carrying a payload.
    #[must_use]
    pub fn ok(provider: ProviderId, payload: serde_json::Value, latency: Duration) -> Self {
        Self {
            provider,
            status: FetchStatus::Ok,
            payload: Some(payload),
            latency,
            error: None,
        }
    }

    /// A timed-out invocation.
    #[must_use]
    pub fn timeout(provider: ProviderId, latency: Duration) -> Self {
        Self {
            provider,
            status: FetchStatus::Timeout,
            payload: None,
            latency,
            error: Some(FailureDetail::transient("provider timed out")),
        }
    }

    /// A failed invocation.
    #[must_use]
    pub fn error(provider: ProviderId, detail: FailureDetail, latency: Duration) -> Self {
        Self {
            provider,
            status: FetchStatus::Error,
            payload: None,
            latency,
            error: Some(detail),
        }
    }

    /// A provider that was never invoked.
    #[must_use]
    pub fn skipped(provider: ProviderId, reason: impl Into<String>) -> Self {
        Self {
            provider,
            status: FetchStatus::Skipped,
            payload: None,
            latency: Duration::ZERO,
            error: Some(FailureDetail::permanent(reason)),
        }
    }
}

/// A single piece of supporting evidence on a finding.
///
/// Evidence values are descriptive fragments (a breach name, a site URL,
/// a carrier name), never the scanned identifier itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Evidence {
    /// What this evidence describes (e.g. `breach_name`, `profile_url`)
    pub key: String,
    /// The evidence value
    pub value: String,
}

impl Evidence {
    /// Create an evidence entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A canonical, provider-agnostic exposure finding.
///
/// `kind` is a dotted lowercase path whose first segment names the signal
/// category (e.g. `email.disposable`, `darkweb.plaintext_password`,
/// `social.profile_found`). The scoring layer keys its delta table on
/// these kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Provider that produced the underlying signal
    pub provider: ProviderId,
    /// Dotted signal kind, lowercase
    pub kind: String,
    /// Severity of the signal
    pub severity: Severity,
    /// Confidence in the signal, 0.0-1.0
    pub confidence: f64,
    /// Supporting evidence fragments
    pub evidence: Vec<Evidence>,
    /// When the signal was observed
    pub observed_at: Timestamp,
    /// Free-form string metadata (counts, categories, locales)
    pub metadata: BTreeMap<String, String>,
}

impl Finding {
    /// Create a finding with no evidence or metadata.
    #[must_use]
    pub fn new(
        provider: ProviderId,
        kind: impl Into<String>,
        severity: Severity,
        confidence: f64,
    ) -> Self {
        Self {
            provider,
            kind: kind.into(),
            severity,
            confidence: confidence.clamp(0.0, 1.0),
            evidence: Vec::new(),
            observed_at: Timestamp::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach an evidence entry (builder style).
    #[must_use]
    pub fn with_evidence(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.evidence.push(Evidence::new(key, value));
        self
    }

    /// Attach a metadata entry (builder style).
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Override the observation timestamp (builder style).
    #[must_use]
    pub fn with_observed_at(mut self, observed_at: Timestamp) -> Self {
        self.observed_at = observed_at;
        self
    }

    /// Look up an evidence value by key.
    #[must_use]
    pub fn evidence_value(&self, key: &str) -> Option<&str> {
        self.evidence
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// The category segment of the kind (text before the first dot).
    #[must_use]
    pub fn category(&self) -> &str {
        self.kind.split('.').next().unwrap_or(&self.kind)
    }
}
