//! In-memory adapter registry with capability queries.

use crate::adapter::ProviderAdapter;
use crate::error::{ProviderError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use traceprint_core::{IdentifierType, ProviderId};
use tracing::info;

/// Thread-safe registry of live provider adapters.
///
/// The dispatcher resolves requested provider IDs against this registry
/// and filters by identifier-type capability before planning a session.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: Arc<RwLock<HashMap<ProviderId, Arc<dyn ProviderAdapter>>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            adapters: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register an adapter, replacing any previous adapter with the same ID.
    ///
    /// # Errors
    /// Returns error if the adapter's descriptor is invalid.
    pub fn register(&self, adapter: Arc<dyn ProviderAdapter>) -> Result<()> {
        adapter.descriptor().validate()?;
        let id = adapter.descriptor().id.clone();

        let mut cache = self
            .adapters
            .write()
            .expect("acquire write lock on adapters");
        cache.insert(id.clone(), adapter);
        info!(provider = %id, count = cache.len(), "registered provider adapter");
        Ok(())
    }

    /// Get an adapter by provider ID.
    ///
    /// # Errors
    /// Returns error if the provider is not registered.
    pub fn get(&self, provider_id: &ProviderId) -> Result<Arc<dyn ProviderAdapter>> {
        let cache = self
            .adapters
            .read()
            .expect("acquire read lock on adapters");

        cache
            .get(provider_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                provider_id: provider_id.to_string(),
            })
    }

    /// Check if a provider is registered.
    #[must_use]
    pub fn contains(&self, provider_id: &ProviderId) -> bool {
        let cache = self
            .adapters
            .read()
            .expect("acquire read lock on adapters");
        cache.contains_key(provider_id)
    }

    /// Get the number of registered adapters.
    #[must_use]
    pub fn count(&self) -> usize {
        let cache = self
            .adapters
            .read()
            .expect("acquire read lock on adapters");
        cache.len()
    }

    /// Get all registered provider IDs.
    #[must_use]
    pub fn all_ids(&self) -> Vec<ProviderId> {
        let cache = self
            .adapters
            .read()
            .expect("acquire read lock on adapters");
        cache.keys().cloned().collect()
    }

    /// All adapters capable of scanning the given identifier type.
    #[must_use]
    pub fn capable_of(&self, kind: IdentifierType) -> Vec<Arc<dyn ProviderAdapter>> {
        let cache = self
            .adapters
            .read()
            .expect("acquire read lock on adapters");

        cache
            .values()
            .filter(|adapter| adapter.descriptor().accepts(kind))
            .cloned()
            .collect()
    }

    /// Total credit cost of the given providers, counting only those that
    /// are registered, configured, and capable of the identifier type.
    ///
    /// This mirrors what admission actually charges for: unconfigured or
    /// incapable providers are skipped and cost nothing.
    #[must_use]
    pub fn billable_cost(&self, provider_ids: &[ProviderId], kind: IdentifierType) -> u32 {
        let cache = self
            .adapters
            .read()
            .expect("acquire read lock on adapters");

        provider_ids
            .iter()
            .filter_map(|id| cache.get(id))
            .filter(|adapter| adapter.is_configured() && adapter.descriptor().accepts(kind))
            .map(|adapter| adapter.descriptor().credit_cost)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canned::CannedAdapter;
    use crate::descriptor::{ProviderCategory, ProviderDescriptor};

    fn email_only(id: &str, cost: u32) -> ProviderDescriptor {
        ProviderDescriptor::new(
            ProviderId::new(id).expect("valid id"),
            format!("Test {id}"),
            ProviderCategory::Risk,
            vec![IdentifierType::Email],
        )
        .with_credit_cost(cost)
    }

    #[test]
    fn test_register_and_get() {
        let registry = ProviderRegistry::new();
        let adapter = Arc::new(CannedAdapter::new("hibp"));
        registry.register(adapter).expect("register adapter");

        let id = ProviderId::new("hibp").expect("valid id");
        assert!(registry.contains(&id));
        assert_eq!(registry.count(), 1);
        assert!(registry.get(&id).is_ok());

        let missing = ProviderId::new("nope-nope").expect("valid id");
        assert!(matches!(
            registry.get(&missing),
            Err(ProviderError::NotFound { .. })
        ));
    }

    #[test]
    fn test_capable_of_filters_by_identifier_type() {
        let registry = ProviderRegistry::new();
        registry
            .register(Arc::new(
                CannedAdapter::new("ipqs_email").with_descriptor(email_only("ipqs_email", 2)),
            ))
            .expect("register adapter");
        registry
            .register(Arc::new(CannedAdapter::new("maigret")))
            .expect("register adapter");

        assert_eq!(registry.capable_of(IdentifierType::Email).len(), 2);
        // Only the all-type canned adapter takes phone numbers
        assert_eq!(registry.capable_of(IdentifierType::Phone).len(), 1);
    }

    #[test]
    fn test_billable_cost_skips_unconfigured() {
        let registry = ProviderRegistry::new();
        registry
            .register(Arc::new(
                CannedAdapter::new("ipqs_email").with_descriptor(email_only("ipqs_email", 2)),
            ))
            .expect("register adapter");
        registry
            .register(Arc::new(
                CannedAdapter::new("abstract-email")
                    .with_descriptor(email_only("abstract-email", 1))
                    .unconfigured(),
            ))
            .expect("register adapter");

        let ids = vec![
            ProviderId::new("ipqs_email").expect("valid id"),
            ProviderId::new("abstract-email").expect("valid id"),
            ProviderId::new("unregistered").expect("valid id"),
        ];
        assert_eq!(registry.billable_cost(&ids, IdentifierType::Email), 2);
        assert_eq!(registry.billable_cost(&ids, IdentifierType::Phone), 0);
    }
}
