//! Rule dispatch over raw provider results.

use crate::error::{NormalizeError, Result};
use crate::providers::{abstract_api, breach, ipqs, presence};
use std::collections::HashSet;
use traceprint_core::{Finding, Identifier, IdentifierType, RawProviderResult, Timestamp};

/// Evidence keys that may carry an email belonging to the same subject.
const SECONDARY_EMAIL_KEYS: &[&str] = &["linked_email", "email", "contact_email"];
/// Evidence keys that may carry a phone number belonging to the same subject.
const SECONDARY_PHONE_KEYS: &[&str] = &["linked_phone", "phone", "contact_phone"];

/// Normalize one raw provider result into canonical findings.
///
/// Non-`Ok` results normalize to an empty list: a timeout or skip carries
/// no payload to extract from. Empty findings are already dropped inside
/// the rule sets (a rule either emits a complete finding or nothing).
///
/// # Errors
/// Returns `UnknownProvider` when no rule set covers the provider, and
/// `Payload` when an `Ok` result arrives without a payload. Both are
/// per-provider errors; the session continues without this provider's
/// findings.
pub fn normalize(raw: &RawProviderResult) -> Result<Vec<Finding>> {
    if !raw.status.is_ok() {
        return Ok(Vec::new());
    }

    let payload = raw.payload.as_ref().ok_or_else(|| NormalizeError::Payload {
        provider_id: raw.provider.to_string(),
        reason: "ok result without payload".to_string(),
    })?;

    let observed_at = Timestamp::now();
    let provider = &raw.provider;

    let findings = match provider.as_str() {
        "abstract_email" => abstract_api::extract(provider, payload, observed_at),
        "ipqs_email" => ipqs::extract_email(provider, payload, observed_at),
        "ipqs_phone" => ipqs::extract_phone(provider, payload, observed_at),
        "ipqs_ip" => ipqs::extract_ip(provider, payload, observed_at),
        "ipqs_darkweb" => ipqs::extract_darkweb(provider, payload, observed_at),
        "hibp" => breach::extract(provider, payload, observed_at),
        "maigret" | "sherlock" => presence::extract_profiles(provider, payload, observed_at),
        "holehe" => presence::extract_accounts(provider, payload, observed_at),
        "whatsapp_presence" => presence::extract_messaging(provider, payload, observed_at),
        "broker_index" => presence::extract_listings(provider, payload, observed_at),
        other => {
            return Err(NormalizeError::UnknownProvider {
                provider_id: other.to_string(),
            })
        }
    };

    tracing::debug!(
        provider = %provider,
        findings = findings.len(),
        "normalized provider result"
    );
    Ok(findings)
}

/// Collect normalized secondary identifiers surfaced as evidence.
///
/// A phone lookup that returns an associated email, or a broker listing
/// that exposes a contact phone, links otherwise-unrelated findings. The
/// correlator matches on these after they pass the same validation and
/// canonicalization as primary identifiers; values that fail validation
/// are silently dropped.
#[must_use]
pub fn secondary_identifiers(findings: &[Finding]) -> Vec<Identifier> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for finding in findings {
        for evidence in &finding.evidence {
            let candidate = if SECONDARY_EMAIL_KEYS.contains(&evidence.key.as_str()) {
                Identifier::new(IdentifierType::Email, &evidence.value).ok()
            } else if SECONDARY_PHONE_KEYS.contains(&evidence.key.as_str()) {
                Identifier::new(IdentifierType::Phone, &evidence.value).ok()
            } else {
                None
            };

            if let Some(identifier) = candidate {
                if seen.insert((identifier.kind(), identifier.value().to_string())) {
                    out.push(identifier);
                }
            }
        }
    }

    out
}

/// Rewrite secondary-identifier evidence values into canonical form.
///
/// Correlation matches evidence values verbatim, so `Jane@Example.com`
/// and `jane@example.com` must not read as two different links. This
/// pass re-runs identifier validation over the linking evidence keys and
/// replaces each value with its canonical spelling; values that fail
/// validation are left untouched.
pub fn canonicalize_evidence(findings: &mut [Finding]) {
    for finding in findings {
        for evidence in &mut finding.evidence {
            let canonical = if SECONDARY_EMAIL_KEYS.contains(&evidence.key.as_str()) {
                Identifier::new(IdentifierType::Email, &evidence.value).ok()
            } else if SECONDARY_PHONE_KEYS.contains(&evidence.key.as_str()) {
                Identifier::new(IdentifierType::Phone, &evidence.value).ok()
            } else {
                None
            };
            if let Some(identifier) = canonical {
                evidence.value = identifier.value().to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use traceprint_core::{FetchStatus, ProviderId, Severity};

    fn provider(id: &str) -> ProviderId {
        ProviderId::new(id).expect("valid id")
    }

    fn ok_result(id: &str, payload: serde_json::Value) -> RawProviderResult {
        RawProviderResult::ok(provider(id), payload, Duration::from_millis(50))
    }

    #[test]
    fn test_normalize_dispatches_by_provider() {
        let raw = ok_result("ipqs_email", json!({"leaked": true}));
        let findings = normalize(&raw).expect("normalize");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, "email.leaked");
    }

    #[test]
    fn test_normalize_unknown_provider() {
        let raw = ok_result("mystery_feed", json!({}));
        assert!(matches!(
            normalize(&raw),
            Err(NormalizeError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn test_normalize_non_ok_yields_empty() {
        let raw = RawProviderResult::timeout(provider("ipqs_email"), Duration::from_secs(20));
        let findings = normalize(&raw).expect("normalize");
        assert!(findings.is_empty());

        let raw = RawProviderResult::skipped(provider("hibp"), "no key");
        assert!(normalize(&raw).expect("normalize").is_empty());
    }

    #[test]
    fn test_normalize_ok_without_payload_is_error() {
        let mut raw = ok_result("hibp", json!({}));
        raw.payload = None;
        raw.status = FetchStatus::Ok;
        assert!(matches!(normalize(&raw), Err(NormalizeError::Payload { .. })));
    }

    #[test]
    fn test_secondary_identifiers_extracted_and_deduped() {
        let findings = vec![
            Finding::new(provider("ipqs_phone"), "phone.linked_account", Severity::Low, 0.6)
                .with_evidence("linked_email", "Jane@Example.com"),
            Finding::new(provider("broker_index"), "broker.listing", Severity::Medium, 0.7)
                .with_evidence("email", "jane@example.com")
                .with_evidence("contact_phone", "+14155550134"),
            Finding::new(provider("maigret"), "profile.presence", Severity::Low, 0.7)
                .with_evidence("platform", "GitHub"),
        ];

        let secondary = secondary_identifiers(&findings);
        // Canonicalization folds the two email spellings together
        assert_eq!(secondary.len(), 2);
        assert!(secondary
            .iter()
            .any(|i| i.kind() == IdentifierType::Email && i.value() == "jane@example.com"));
        assert!(secondary
            .iter()
            .any(|i| i.kind() == IdentifierType::Phone && i.value() == "+14155550134"));
    }

    #[test]
    fn test_canonicalize_evidence_rewrites_linking_keys() {
        let mut findings = vec![Finding::new(
            provider("ipqs_phone"),
            "phone.linked_account",
            Severity::Low,
            0.6,
        )
        .with_evidence("linked_email", " Jane@Example.COM ")
        .with_evidence("carrier", "T-Mobile")];

        canonicalize_evidence(&mut findings);
        assert_eq!(
            findings[0].evidence_value("linked_email"),
            Some("jane@example.com")
        );
        // Non-linking evidence is untouched
        assert_eq!(findings[0].evidence_value("carrier"), Some("T-Mobile"));
    }

    #[test]
    fn test_every_catalog_provider_has_a_rule_set() {
        for descriptor in traceprint_provider::builtin_descriptors() {
            let raw = ok_result(descriptor.id.as_str(), json!({}));
            // An empty payload may yield no findings, but never UnknownProvider
            assert!(
                normalize(&raw).is_ok(),
                "no rule set for catalog provider {}",
                descriptor.id
            );
        }
    }

    #[test]
    fn test_secondary_identifiers_drop_invalid() {
        let findings = vec![Finding::new(
            provider("broker_index"),
            "broker.listing",
            Severity::Medium,
            0.7,
        )
        .with_evidence("email", "not-an-email")];
        assert!(secondary_identifiers(&findings).is_empty());
    }
}
