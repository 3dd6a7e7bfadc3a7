//! Per-provider extraction rule sets.
//!
//! Each module maps one provider family's payload shape to canonical
//! findings. Rules are pure functions: same payload, same findings.

pub mod abstract_api;
pub mod breach;
pub mod ipqs;
pub mod presence;
