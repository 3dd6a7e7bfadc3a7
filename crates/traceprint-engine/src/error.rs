//! Engine error taxonomy.

use thiserror::Error;

/// Errors for scan session operations.
///
/// Provider-level failures (`ProviderTimeout`, `ProviderUnavailable`,
/// `Provider`) never fail a session on their own; they become per-provider
/// failure reasons on a partial result. `InsufficientCredits` is the
/// pre-flight fatal path, `InternalAggregation` the only post-flight one.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The workspace balance cannot cover the scan
    #[error("insufficient credits: {available} available, {required} required")]
    InsufficientCredits {
        /// Balance at admission time
        available: u32,
        /// Cost of the requested scan
        required: u32,
    },

    /// A provider exceeded its invocation timeout
    #[error("provider timed out: {provider_id}")]
    ProviderTimeout {
        /// The provider that timed out
        provider_id: String,
    },

    /// A provider was requested but is not registered or cannot run
    #[error("provider unavailable: {provider_id}: {reason}")]
    ProviderUnavailable {
        /// The unavailable provider
        provider_id: String,
        /// Why it cannot run
        reason: String,
    },

    /// A provider failed after its retry
    #[error("provider failed: {provider_id}: {message}")]
    Provider {
        /// The failing provider
        provider_id: String,
        /// Failure summary
        message: String,
    },

    /// A payload could not be normalized (per-provider, non-fatal)
    #[error(transparent)]
    Normalization(#[from] traceprint_normalize::NormalizeError),

    /// Aggregation failed after all providers returned (post-flight fatal)
    #[error("internal aggregation failure: {0}")]
    InternalAggregation(String),

    /// The requested session does not exist
    #[error("session not found: {session_id}")]
    SessionNotFound {
        /// The missing session ID
        session_id: String,
    },

    /// Request validation failed
    #[error("invalid scan request: {0}")]
    InvalidRequest(String),

    /// Underlying core error
    #[error(transparent)]
    Core(#[from] traceprint_core::CoreError),
}

/// Result type alias using `ScanError`.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::InsufficientCredits {
            available: 2,
            required: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient credits: 2 available, 5 required"
        );

        let err = ScanError::ProviderTimeout {
            provider_id: "maigret".to_string(),
        };
        assert_eq!(err.to_string(), "provider timed out: maigret");
    }

    #[test]
    fn test_normalization_error_wraps() {
        let inner = traceprint_normalize::NormalizeError::UnknownProvider {
            provider_id: "mystery".to_string(),
        };
        let err: ScanError = inner.into();
        assert!(matches!(err, ScanError::Normalization(_)));
    }
}
