//! Built-in provider catalog.
//!
//! Descriptors for the providers Traceprint knows how to talk to out of
//! the box. Registering a live adapter for each is still up to the host:
//! the catalog only carries the metadata (category, accepted identifier
//! types, credit cost, key requirement).

use crate::descriptor::{ProviderCategory, ProviderDescriptor};
use traceprint_core::{IdentifierType, ProviderId};

fn id(raw: &str) -> ProviderId {
    // Catalog IDs are compile-time constants; a bad one is a programming error.
    ProviderId::new(raw).expect("catalog provider id is valid")
}

/// All built-in provider descriptors.
#[must_use]
pub fn builtin_descriptors() -> Vec<ProviderDescriptor> {
    vec![
        ProviderDescriptor::new(
            id("abstract_email"),
            "AbstractAPI Email Validation",
            ProviderCategory::Risk,
            vec![IdentifierType::Email],
        )
        .with_credit_cost(1)
        .with_required_key(),
        ProviderDescriptor::new(
            id("ipqs_email"),
            "IPQS Email Verification",
            ProviderCategory::Risk,
            vec![IdentifierType::Email],
        )
        .with_credit_cost(2)
        .with_required_key(),
        ProviderDescriptor::new(
            id("ipqs_phone"),
            "IPQS Phone Validation",
            ProviderCategory::Carrier,
            vec![IdentifierType::Phone],
        )
        .with_credit_cost(2)
        .with_required_key(),
        ProviderDescriptor::new(
            id("ipqs_ip"),
            "IPQS IP Reputation",
            ProviderCategory::Risk,
            vec![IdentifierType::Ip],
        )
        .with_credit_cost(2)
        .with_required_key(),
        ProviderDescriptor::new(
            id("ipqs_darkweb"),
            "IPQS Dark Web Leaks",
            ProviderCategory::Breach,
            vec![IdentifierType::Email, IdentifierType::Username],
        )
        .with_credit_cost(3)
        .with_required_key(),
        ProviderDescriptor::new(
            id("hibp"),
            "Have I Been Pwned",
            ProviderCategory::Breach,
            vec![IdentifierType::Email],
        )
        .with_credit_cost(1)
        .with_required_key(),
        ProviderDescriptor::new(
            id("maigret"),
            "Maigret Username Search",
            ProviderCategory::Osint,
            vec![IdentifierType::Username],
        )
        .with_credit_cost(3),
        ProviderDescriptor::new(
            id("sherlock"),
            "Sherlock Username Search",
            ProviderCategory::Social,
            vec![IdentifierType::Username],
        )
        .with_credit_cost(2),
        ProviderDescriptor::new(
            id("holehe"),
            "Holehe Account Discovery",
            ProviderCategory::Osint,
            vec![IdentifierType::Email],
        )
        .with_credit_cost(2),
        ProviderDescriptor::new(
            id("whatsapp_presence"),
            "WhatsApp Presence Check",
            ProviderCategory::Messaging,
            vec![IdentifierType::Phone],
        )
        .with_credit_cost(1),
        ProviderDescriptor::new(
            id("broker_index"),
            "People-Search Broker Index",
            ProviderCategory::Broker,
            vec![IdentifierType::Email, IdentifierType::Phone, IdentifierType::Username],
        )
        .with_credit_cost(1),
    ]
}

/// Look up a built-in descriptor by provider ID string.
#[must_use]
pub fn find(provider_id: &str) -> Option<ProviderDescriptor> {
    builtin_descriptors()
        .into_iter()
        .find(|d| d.id.as_str() == provider_id)
}
