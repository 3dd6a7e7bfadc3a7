//! Traceprint Normalize - Heterogeneous payload normalization.
//!
//! Each scanning provider returns its own JSON shape. This crate holds
//! the per-provider rule sets that map one `RawProviderResult` into zero
//! or more canonical `Finding`s, plus the defensive accessors those rules
//! use to survive missing or renamed fields.
//!
//! # Modules
//!
//! - [`error`] - Normalization error types
//! - [`value`] - Defensive accessors over untyped JSON
//! - [`providers`] - Per-provider extraction rule sets
//! - [`normalizer`] - Rule dispatch and the secondary-identifier pass

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod normalizer;
pub mod providers;
pub mod value;

pub use error::{NormalizeError, Result};
pub use normalizer::{canonicalize_evidence, normalize, secondary_identifiers};
