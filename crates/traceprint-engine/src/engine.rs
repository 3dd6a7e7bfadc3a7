//! The scan session manager.
//!
//! `ScanEngine` admits a scan synchronously (validation, credit debit,
//! audit record), then runs it in a background task and returns the
//! session ID immediately for status polling. Raw provider results live
//! only inside the background task: once normalization finishes they are
//! dropped, and only findings, groups, and the score survive.

use crate::audit::{AuditRecord, AuditSink};
use crate::dispatch::Dispatcher;
use crate::error::{Result, ScanError};
use crate::session::{ProviderState, ScanRequest, ScanSession, SessionStatus};
use crate::store::{ResultStore, SessionReport};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;
use traceprint_analysis::{correlate, score, CategoryWeights};
use traceprint_core::{EngineConfig, Finding, FetchStatus, SessionId, Timestamp};
use traceprint_normalize::{canonicalize_evidence, normalize, secondary_identifiers};
use traceprint_provider::{CreditLedger, ProviderRegistry};

/// A session's current state plus its report, when one exists.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// The session state
    pub session: ScanSession,
    /// The report, present once the session completed or went partial
    pub report: Option<SessionReport>,
}

/// Orchestrates scan sessions end to end.
#[derive(Clone)]
pub struct ScanEngine {
    dispatcher: Arc<Dispatcher>,
    sessions: Arc<RwLock<HashMap<SessionId, ScanSession>>>,
    reports: Arc<RwLock<HashMap<SessionId, SessionReport>>>,
    cancellations: Arc<RwLock<HashMap<SessionId, CancellationToken>>>,
    store: Arc<dyn ResultStore>,
    audit: Arc<dyn AuditSink>,
    weights: CategoryWeights,
}

impl ScanEngine {
    /// Create an engine.
    #[must_use]
    pub fn new(
        registry: ProviderRegistry,
        ledger: Arc<dyn CreditLedger>,
        store: Arc<dyn ResultStore>,
        audit: Arc<dyn AuditSink>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(registry, ledger, config.dispatch.clone())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            reports: Arc::new(RwLock::new(HashMap::new())),
            cancellations: Arc::new(RwLock::new(HashMap::new())),
            store,
            audit,
            weights: CategoryWeights::default(),
        }
    }

    /// Override the scoring weights (builder style).
    #[must_use]
    pub fn with_weights(mut self, weights: CategoryWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Admit and launch a scan, returning the session ID immediately.
    ///
    /// Admission is synchronous: validation, the single credit debit,
    /// and the audit record all happen before this returns. A request
    /// refused for insufficient credits creates no session and charges
    /// nothing.
    pub async fn submit_scan(&self, request: ScanRequest) -> Result<SessionId> {
        request.validate()?;
        self.dispatcher.admit(&request).await?;

        let session_id = SessionId::generate();
        self.audit
            .record(AuditRecord::for_admission(
                session_id.clone(),
                request.workspace.clone(),
                request.purpose.clone(),
                &request.identifier,
            ))
            .await;

        let session = ScanSession::new(session_id.clone(), request);
        let cancel = CancellationToken::new();
        {
            let mut sessions = self.sessions.write().expect("acquire write lock on sessions");
            sessions.insert(session_id.clone(), session);
        }
        {
            let mut cancellations = self
                .cancellations
                .write()
                .expect("acquire write lock on cancellations");
            cancellations.insert(session_id.clone(), cancel.clone());
        }

        let engine = self.clone();
        let id_for_task = session_id.clone();
        tokio::spawn(async move {
            engine.run_session(id_for_task, cancel).await;
        });

        Ok(session_id)
    }

    /// Look up a session and, if terminal, its report.
    #[must_use]
    pub fn get_scan_result(&self, session_id: &SessionId) -> Option<ScanResult> {
        let session = {
            let sessions = self.sessions.read().expect("acquire read lock on sessions");
            sessions.get(session_id).cloned()?
        };
        let report = {
            let reports = self.reports.read().expect("acquire read lock on reports");
            reports.get(session_id).cloned()
        };
        Some(ScanResult { session, report })
    }

    /// Request cancellation of an in-flight session.
    ///
    /// Providers that already returned keep their results; nothing new
    /// starts after this. Returns false for unknown or already-terminal
    /// sessions.
    #[must_use]
    pub fn cancel_scan(&self, session_id: &SessionId) -> bool {
        let cancellations = self
            .cancellations
            .read()
            .expect("acquire read lock on cancellations");
        if let Some(token) = cancellations.get(session_id) {
            token.cancel();
            true
        } else {
            false
        }
    }

    async fn run_session(&self, session_id: SessionId, cancel: CancellationToken) {
        let Some(request) = self.with_session(&session_id, |session| {
            session.status = SessionStatus::Dispatching;
            for state in session.providers.values_mut() {
                *state = ProviderState::Running;
            }
            session.request.clone()
        }) else {
            tracing::error!(session = %session_id, "session vanished before dispatch");
            return;
        };

        let raw_results = self.dispatcher.fan_out(&request, &cancel).await;

        // Full fan-in reached: record terminal provider states and the
        // failure reasons partial results must carry.
        self.with_session(&session_id, |session| {
            for raw in &raw_results {
                session
                    .providers
                    .insert(raw.provider.clone(), ProviderState::from(raw.status));
                if ProviderState::from(raw.status).is_failure() {
                    let reason = match raw.status {
                        FetchStatus::Timeout => ScanError::ProviderTimeout {
                            provider_id: raw.provider.to_string(),
                        }
                        .to_string(),
                        _ => ScanError::Provider {
                            provider_id: raw.provider.to_string(),
                            message: raw
                                .error
                                .as_ref()
                                .map_or_else(|| "unknown error".to_string(), |e| e.message.clone()),
                        }
                        .to_string(),
                    };
                    session.failure_reasons.insert(raw.provider.clone(), reason);
                }
            }
            session.status = SessionStatus::Aggregating;
        });

        // Normalization errors are per-provider: logged, session continues.
        let mut findings: Vec<Finding> = Vec::new();
        for raw in &raw_results {
            match normalize(raw) {
                Ok(mut extracted) => findings.append(&mut extracted),
                Err(err) => {
                    let err = ScanError::Normalization(err);
                    tracing::warn!(session = %session_id, error = %err,
                        "dropping provider result that failed normalization");
                }
            }
        }
        drop(raw_results);

        canonicalize_evidence(&mut findings);
        let secondary = secondary_identifiers(&findings);
        if !secondary.is_empty() {
            tracing::debug!(session = %session_id, count = secondary.len(),
                "secondary identifiers surfaced for correlation");
        }

        let groups = correlate(findings.clone());
        let exposure = score(&groups, &self.weights);

        let outcome = self
            .with_session(&session_id, |session| session.classify_outcome())
            .unwrap_or(SessionStatus::Failed);

        let final_status = if outcome == SessionStatus::Failed {
            SessionStatus::Failed
        } else {
            let report = SessionReport {
                session_id: session_id.clone(),
                findings,
                groups,
                score: exposure,
            };
            match self.store.persist(&report).await {
                Ok(()) => {
                    let mut reports = self
                        .reports
                        .write()
                        .expect("acquire write lock on reports");
                    reports.insert(session_id.clone(), report);
                    outcome
                }
                Err(err) => {
                    let err = ScanError::InternalAggregation(err.to_string());
                    tracing::error!(session = %session_id, error = %err,
                        "failed to persist session report");
                    SessionStatus::Failed
                }
            }
        };

        self.with_session(&session_id, |session| {
            session.status = final_status;
            session.completed_at = Some(Timestamp::now());
        });
        {
            let mut cancellations = self
                .cancellations
                .write()
                .expect("acquire write lock on cancellations");
            cancellations.remove(&session_id);
        }

        tracing::info!(session = %session_id, status = %final_status, "scan session finished");
    }

    fn with_session<T>(
        &self,
        session_id: &SessionId,
        f: impl FnOnce(&mut ScanSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().expect("acquire write lock on sessions");
        sessions.get_mut(session_id).map(f)
    }
}
