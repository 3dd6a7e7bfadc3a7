//! Traceprint Provider - Scanning provider abstraction for the Traceprint engine.
//!
//! This crate defines the provider adapter trait, the descriptor catalog,
//! the in-memory registry the dispatcher draws from, and the credit ledger
//! that gates paid providers.
//!
//! # Modules
//!
//! - [`error`] - Provider and adapter error types
//! - [`descriptor`] - Provider metadata (category, accepted identifiers, credit cost)
//! - [`adapter`] - The `ProviderAdapter` trait and its timeout-wrapping invoke path
//! - [`registry`] - Thread-safe registry of live adapters
//! - [`rest`] - Generic REST adapter for HTTP JSON providers
//! - [`canned`] - Scriptable in-process adapter for tests
//! - [`catalog`] - Built-in provider descriptors
//! - [`ledger`] - Credit accounting trait and in-memory implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod adapter;
pub mod canned;
pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod rest;

pub use adapter::ProviderAdapter;
pub use canned::CannedAdapter;
pub use catalog::builtin_descriptors;
pub use descriptor::{ProviderCategory, ProviderDescriptor};
pub use error::{AdapterError, AdapterResult, ProviderError, Result};
pub use ledger::{CreditLedger, DebitOutcome, InMemoryLedger};
pub use registry::ProviderRegistry;
pub use rest::{KeyPlacement, RestAdapter};
