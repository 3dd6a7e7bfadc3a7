//! Traceprint Engine - Scan session orchestration.
//!
//! Ties the provider, normalization, and analysis layers together: a
//! `ScanEngine` admits a scan (credit check, audit record), fans the
//! identifier out to the requested providers under timeout/retry/skip
//! semantics, waits for full fan-in, then normalizes, correlates, scores,
//! and persists the result.
//!
//! # Modules
//!
//! - [`error`] - The engine-level error taxonomy
//! - [`session`] - Scan request, session state machine, provider states
//! - [`dispatch`] - Credit admission and bounded concurrent fan-out
//! - [`store`] - Session report persistence trait + in-memory store
//! - [`audit`] - Audit records with masked identifiers
//! - [`engine`] - The `ScanEngine` session manager

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod audit;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod session;
pub mod store;

pub use audit::{AuditRecord, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use dispatch::Dispatcher;
pub use engine::{ScanEngine, ScanResult};
pub use error::{Result, ScanError};
pub use session::{ProviderState, ScanRequest, ScanSession, SessionStatus};
pub use store::{InMemoryStore, ResultStore, SessionReport};
