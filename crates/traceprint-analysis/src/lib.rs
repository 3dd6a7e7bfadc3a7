//! Traceprint Analysis - Correlation and exposure scoring.
//!
//! Takes the normalized findings of one scan session, groups the ones
//! that describe the same account or signal across providers, and folds
//! the groups into a deterministic 0-100 exposure score with a
//! qualitative tier.
//!
//! # Modules
//!
//! - [`correlate`] - Cross-provider grouping, agreement boost, conflict flagging
//! - [`score`] - Category sub-scores, delta table, credit-weighted overall, tiers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod correlate;
pub mod score;

pub use correlate::{correlate, CorrelationGroup};
pub use score::{score, CategoryWeights, ExposureScore, ScoreCategory, Tier};
