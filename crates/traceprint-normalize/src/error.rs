//! Error types for normalization.

use thiserror::Error;

/// Errors raised while normalizing a raw provider result.
///
/// These are per-provider: the engine logs them and continues the session
/// with the remaining providers' findings.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// No rule set exists for this provider
    #[error("no normalization rules for provider: {provider_id}")]
    UnknownProvider {
        /// The unhandled provider ID
        provider_id: String,
    },

    /// The payload is present but structurally unusable
    #[error("unusable payload from {provider_id}: {reason}")]
    Payload {
        /// Provider whose payload failed
        provider_id: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Result type alias using `NormalizeError`.
pub type Result<T> = std::result::Result<T, NormalizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NormalizeError::UnknownProvider {
            provider_id: "mystery".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no normalization rules for provider: mystery"
        );
    }
}
