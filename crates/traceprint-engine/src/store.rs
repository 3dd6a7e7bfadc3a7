//! Session report persistence.

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use traceprint_analysis::{CorrelationGroup, ExposureScore};
use traceprint_core::{Finding, SessionId};

/// The persisted output of one completed or partial session.
///
/// Only normalized data appears here; raw provider payloads are dropped
/// after normalization and never written anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Which session produced the report
    pub session_id: SessionId,
    /// All normalized findings
    pub findings: Vec<Finding>,
    /// Correlation groups over the findings
    pub groups: Vec<CorrelationGroup>,
    /// The exposure assessment
    pub score: ExposureScore,
}

/// Persistence collaborator for session reports.
///
/// Called exactly once per completed or partial session.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist a session report.
    async fn persist(&self, report: &SessionReport) -> Result<()>;
}

/// In-memory store for tests and single-process deployments.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    reports: Arc<RwLock<HashMap<SessionId, SessionReport>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a previously persisted report.
    #[must_use]
    pub fn load(&self, session_id: &SessionId) -> Option<SessionReport> {
        let reports = self.reports.read().expect("acquire read lock on reports");
        reports.get(session_id).cloned()
    }

    /// Number of persisted reports.
    #[must_use]
    pub fn count(&self) -> usize {
        let reports = self.reports.read().expect("acquire read lock on reports");
        reports.len()
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn persist(&self, report: &SessionReport) -> Result<()> {
        let mut reports = self.reports.write().expect("acquire write lock on reports");
        if reports.contains_key(&report.session_id) {
            return Err(ScanError::InternalAggregation(format!(
                "report already persisted for session {}",
                report.session_id
            )));
        }
        reports.insert(report.session_id.clone(), report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traceprint_analysis::{score, CategoryWeights};

    fn report(session_id: SessionId) -> SessionReport {
        SessionReport {
            session_id,
            findings: Vec::new(),
            groups: Vec::new(),
            score: score(&[], &CategoryWeights::default()),
        }
    }

    #[tokio::test]
    async fn test_persist_and_load() {
        let store = InMemoryStore::new();
        let id = SessionId::generate();
        store.persist(&report(id.clone())).await.expect("persist");

        assert_eq!(store.count(), 1);
        let loaded = store.load(&id).expect("report present");
        assert_eq!(loaded.session_id, id);
        assert!(store.load(&SessionId::generate()).is_none());
    }

    #[tokio::test]
    async fn test_persist_is_write_once() {
        let store = InMemoryStore::new();
        let id = SessionId::generate();
        store.persist(&report(id.clone())).await.expect("persist");
        assert!(store.persist(&report(id)).await.is_err());
    }
}
