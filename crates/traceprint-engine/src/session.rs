//! Scan requests and the session state machine.

use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use traceprint_core::{FetchStatus, Identifier, ProviderId, SessionId, Timestamp, WorkspaceId};

/// An immutable scan request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// The identifier to scan
    pub identifier: Identifier,
    /// Providers to dispatch to
    pub providers: Vec<ProviderId>,
    /// The requesting workspace
    pub workspace: WorkspaceId,
    /// Free-form purpose tag recorded in the audit trail
    pub purpose: String,
}

impl ScanRequest {
    /// Create a scan request.
    #[must_use]
    pub fn new(
        identifier: Identifier,
        providers: Vec<ProviderId>,
        workspace: WorkspaceId,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            identifier,
            providers,
            workspace,
            purpose: purpose.into(),
        }
    }

    /// Validate the request before admission.
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(ScanError::InvalidRequest(
                "at least one provider must be requested".to_string(),
            ));
        }
        let mut deduped = self.providers.clone();
        deduped.sort();
        deduped.dedup();
        if deduped.len() != self.providers.len() {
            return Err(ScanError::InvalidRequest(
                "duplicate providers in request".to_string(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle state of one provider within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderState {
    /// Not yet started
    Pending,
    /// Invocation in flight
    Running,
    /// Returned a payload
    Ok,
    /// Exceeded its timeout
    Timeout,
    /// Failed after retry
    Error,
    /// Never invoked (unconfigured, incapable, cancelled)
    Skipped,
}

impl ProviderState {
    /// Whether the provider has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ok | Self::Timeout | Self::Error | Self::Skipped)
    }

    /// Whether this terminal state counts as a failure.
    ///
    /// A skip is a deliberate decision, not a failure; it affects neither
    /// the partial/failed classification nor the failure-reason list.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Timeout | Self::Error)
    }
}

impl From<FetchStatus> for ProviderState {
    fn from(status: FetchStatus) -> Self {
        match status {
            FetchStatus::Ok => Self::Ok,
            FetchStatus::Timeout => Self::Timeout,
            FetchStatus::Error => Self::Error,
            FetchStatus::Skipped => Self::Skipped,
        }
    }
}

/// Session lifecycle status.
///
/// `pending -> dispatching -> aggregating -> {completed|partial|failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Admitted, not yet dispatched
    Pending,
    /// Providers in flight
    Dispatching,
    /// Full fan-in reached, normalization/correlation/scoring running
    Aggregating,
    /// All providers terminal, none failed
    Completed,
    /// Some providers produced results, some failed
    Partial,
    /// Every provider failed, or aggregation itself failed
    Failed,
}

impl SessionStatus {
    /// Whether the session has reached a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Partial | Self::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Dispatching => "dispatching",
            Self::Aggregating => "aggregating",
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// One scan session's tracked state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSession {
    /// Session identifier
    pub id: SessionId,
    /// The originating request
    pub request: ScanRequest,
    /// Current lifecycle status
    pub status: SessionStatus,
    /// Per-provider states
    pub providers: BTreeMap<ProviderId, ProviderState>,
    /// Failure reasons for providers that timed out or errored
    pub failure_reasons: BTreeMap<ProviderId, String>,
    /// When the session was admitted
    pub created_at: Timestamp,
    /// When the session reached a terminal status
    pub completed_at: Option<Timestamp>,
}

impl ScanSession {
    /// Create a pending session for an admitted request.
    #[must_use]
    pub fn new(id: SessionId, request: ScanRequest) -> Self {
        let providers = request
            .providers
            .iter()
            .map(|p| (p.clone(), ProviderState::Pending))
            .collect();
        Self {
            id,
            request,
            status: SessionStatus::Pending,
            providers,
            failure_reasons: BTreeMap::new(),
            created_at: Timestamp::now(),
            completed_at: None,
        }
    }

    /// Whether every provider has reached a terminal state.
    #[must_use]
    pub fn all_providers_terminal(&self) -> bool {
        self.providers.values().all(ProviderState::is_terminal)
    }

    /// Classify the terminal status from the per-provider outcomes.
    ///
    /// Any success alongside failures is `partial`; failures with no
    /// successes at all is `failed`; everything else (successes and
    /// skips only) is `completed`.
    #[must_use]
    pub fn classify_outcome(&self) -> SessionStatus {
        let any_ok = self
            .providers
            .values()
            .any(|s| matches!(s, ProviderState::Ok));
        let any_failure = self.providers.values().any(ProviderState::is_failure);

        match (any_ok, any_failure) {
            (_, false) => SessionStatus::Completed,
            (true, true) => SessionStatus::Partial,
            (false, true) => SessionStatus::Failed,
        }
    }
}
