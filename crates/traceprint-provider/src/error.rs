//! Error types for provider operations.

use thiserror::Error;

/// Errors raised inside a provider adapter's fetch path.
///
/// The variant determines how the dispatcher reacts: `Transient` failures
/// get one retry, `Permanent` failures do not, and `NotConfigured` turns
/// into a skip before any network traffic happens.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The adapter is missing credentials or other required setup
    #[error("adapter not configured: {reason}")]
    NotConfigured {
        /// Why the adapter cannot run
        reason: String,
    },

    /// A failure worth retrying (rate limit, 5xx, connection reset)
    #[error("transient provider failure: {message}")]
    Transient {
        /// Failure summary
        message: String,
    },

    /// A failure that will not improve on retry (4xx, malformed response)
    #[error("permanent provider failure: {message}")]
    Permanent {
        /// Failure summary
        message: String,
    },
}

impl AdapterError {
    /// Construct a transient failure.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Construct a permanent failure.
    #[must_use]
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent {
            message: message.into(),
        }
    }

    /// Construct a not-configured error.
    #[must_use]
    pub fn not_configured(reason: impl Into<String>) -> Self {
        Self::NotConfigured {
            reason: reason.into(),
        }
    }

    /// Whether the dispatcher should retry after this error.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Errors for registry and descriptor operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Provider not present in the registry
    #[error("provider not found: {provider_id}")]
    NotFound {
        /// The missing provider ID
        provider_id: String,
    },

    /// Descriptor validation failed
    #[error("invalid provider descriptor: {0}")]
    Validation(String),

    /// Underlying core error
    #[error(transparent)]
    Core(#[from] traceprint_core::CoreError),
}

/// Result type alias for adapter fetch operations.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Result type alias using `ProviderError`.
pub type Result<T> = std::result::Result<T, ProviderError>;
