//! Traceprint Core - Foundation crate for the Traceprint exposure engine.
//!
//! This crate provides the shared types, error handling, and configuration
//! management that all other Traceprint crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`ProviderId`, `Identifier`, `Severity`, `Timestamp`)
//! - [`finding`] - The canonical finding model and ephemeral raw provider results
//!
//! # Example
//!
//! ```rust
//! use traceprint_core::{Identifier, IdentifierType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let identifier = Identifier::new(IdentifierType::Email, "jane.doe@example.com")?;
//! // Display output is masked; raw identifiers never reach logs verbatim.
//! assert_eq!(identifier.to_string(), "j***@example.com");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod finding;
pub mod types;

// Re-export commonly used types
pub use config::{DispatchConfig, EngineConfig, HttpConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use finding::{Evidence, FailureDetail, Finding, RawProviderResult};
pub use types::{
    FetchStatus, Identifier, IdentifierType, ProviderId, SessionId, Severity, Timestamp,
    WorkspaceId,
};
