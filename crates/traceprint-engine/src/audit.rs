//! Audit trail for admitted scans.
//!
//! One record per admitted scan: who asked, for what purpose, when, and
//! which identifier, masked. The raw identifier value never enters an
//! audit record or a log line (mask-on-log, not suppress-on-log).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use traceprint_core::{Identifier, IdentifierType, SessionId, Timestamp, WorkspaceId};

/// One audit record for an admitted scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The admitted session
    pub session_id: SessionId,
    /// The requesting workspace
    pub workspace: WorkspaceId,
    /// The request's purpose tag
    pub purpose: String,
    /// The scanned identifier, masked
    pub identifier_masked: String,
    /// The identifier's type
    pub identifier_type: IdentifierType,
    /// When the scan was admitted
    pub admitted_at: Timestamp,
}

impl AuditRecord {
    /// Build a record for an admitted scan. Masks the identifier here so
    /// no sink ever sees the raw value.
    #[must_use]
    pub fn for_admission(
        session_id: SessionId,
        workspace: WorkspaceId,
        purpose: impl Into<String>,
        identifier: &Identifier,
    ) -> Self {
        Self {
            session_id,
            workspace,
            purpose: purpose.into(),
            identifier_masked: identifier.masked(),
            identifier_type: identifier.kind(),
            admitted_at: Timestamp::now(),
        }
    }
}

/// Append-only audit collaborator.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one record.
    async fn record(&self, record: AuditRecord);
}

/// Sink that emits audit records as structured log events.
#[derive(Clone, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Create the sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) {
        tracing::info!(
            session = %record.session_id,
            workspace = %record.workspace,
            purpose = %record.purpose,
            identifier = %record.identifier_masked,
            identifier_type = %record.identifier_type,
            admitted_at = %record.admitted_at,
            "scan admitted"
        );
    }
}

/// In-memory sink for tests.
#[derive(Clone, Default)]
pub struct InMemoryAuditSink {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        let records = self.records.read().expect("acquire read lock on records");
        records.clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, record: AuditRecord) {
        let mut records = self.records.write().expect("acquire write lock on records");
        records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_audit_record_masks_identifier() {
        let identifier =
            Identifier::new(IdentifierType::Email, "jane.doe@example.com").expect("valid email");
        let record = AuditRecord::for_admission(
            SessionId::generate(),
            WorkspaceId::new("acme").expect("valid workspace"),
            "fraud-review",
            &identifier,
        );

        assert_eq!(record.identifier_masked, "j***@example.com");
        let json = serde_json::to_string(&record).expect("serialize record");
        assert!(!json.contains("jane.doe@example.com"));
    }

    #[tokio::test]
    async fn test_in_memory_sink_appends() {
        let sink = InMemoryAuditSink::new();
        let identifier =
            Identifier::new(IdentifierType::Phone, "+14155550134").expect("valid phone");
        sink.record(AuditRecord::for_admission(
            SessionId::generate(),
            WorkspaceId::new("acme").expect("valid workspace"),
            "kyc",
            &identifier,
        ))
        .await;

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].purpose, "kyc");
        assert!(records[0].identifier_masked.ends_with("34"));
    }
}
