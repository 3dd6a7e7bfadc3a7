//! Provider metadata: what a provider accepts, what it costs, what it needs.

use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use traceprint_core::{IdentifierType, ProviderId};

/// Functional category of a scanning provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    /// Phone carrier and line-type lookups
    Carrier,
    /// Messaging platform presence checks
    Messaging,
    /// Open-source intelligence aggregators
    Osint,
    /// Fraud/risk scoring services
    Risk,
    /// Data broker listings
    Broker,
    /// Breach corpus lookups
    Breach,
    /// Social platform presence checks
    Social,
}

impl ProviderCategory {
    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Carrier => "Carrier Lookup",
            Self::Messaging => "Messaging Presence",
            Self::Osint => "OSINT",
            Self::Risk => "Risk Scoring",
            Self::Broker => "Data Brokers",
            Self::Breach => "Breach Data",
            Self::Social => "Social Presence",
        }
    }
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Static metadata describing one scanning provider.
///
/// Descriptors are what the dispatcher plans against: capability filtering
/// uses `accepts`, admission uses `credit_cost`, and skip decisions use
/// `requires_key` together with the adapter's configured state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Unique provider identifier
    pub id: ProviderId,
    /// Human-readable name
    pub name: String,
    /// Functional category
    pub category: ProviderCategory,
    /// Identifier types this provider can scan
    pub accepts: Vec<IdentifierType>,
    /// Credits one invocation costs (0 for free providers)
    pub credit_cost: u32,
    /// Whether the provider needs an API key to run
    pub requires_key: bool,
}

impl ProviderDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(
        id: ProviderId,
        name: impl Into<String>,
        category: ProviderCategory,
        accepts: Vec<IdentifierType>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            accepts,
            credit_cost: 0,
            requires_key: false,
        }
    }

    /// Set the credit cost (builder style).
    #[must_use]
    pub fn with_credit_cost(mut self, cost: u32) -> Self {
        self.credit_cost = cost;
        self
    }

    /// Mark the provider as requiring an API key (builder style).
    #[must_use]
    pub fn with_required_key(mut self) -> Self {
        self.requires_key = true;
        self
    }

    /// Whether this provider can scan the given identifier type.
    #[must_use]
    pub fn accepts(&self, kind: IdentifierType) -> bool {
        self.accepts.contains(&kind)
    }

    /// Validate descriptor consistency.
    ///
    /// # Errors
    /// Returns error if the descriptor has no name or accepts nothing.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ProviderError::Validation(format!(
                "provider '{}' has an empty name",
                self.id
            )));
        }
        if self.accepts.is_empty() {
            return Err(ProviderError::Validation(format!(
                "provider '{}' accepts no identifier types",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ProviderDescriptor {
        ProviderDescriptor::new(
            ProviderId::new("ipqs_email").expect("valid id"),
            "IPQS Email Verification",
            ProviderCategory::Risk,
            vec![IdentifierType::Email],
        )
        .with_credit_cost(2)
        .with_required_key()
    }

    #[test]
    fn test_descriptor_builder() {
        let d = descriptor();
        assert_eq!(d.credit_cost, 2);
        assert!(d.requires_key);
        assert!(d.accepts(IdentifierType::Email));
        assert!(!d.accepts(IdentifierType::Phone));
    }

    #[test]
    fn test_descriptor_validation() {
        assert!(descriptor().validate().is_ok());

        let mut d = descriptor();
        d.accepts.clear();
        assert!(d.validate().is_err());

        let mut d = descriptor();
        d.name = "  ".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ProviderCategory::Breach).expect("serialize category");
        assert_eq!(json, "\"breach\"");
    }
}
