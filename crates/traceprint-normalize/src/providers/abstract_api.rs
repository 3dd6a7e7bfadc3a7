//! Extraction rules for the AbstractAPI email validation payload.
//!
//! Abstract wraps most booleans in `{ "value": bool, "text": "TRUE" }`
//! envelopes and returns `quality_score` as a string. The accessors in
//! [`crate::value`] absorb both quirks.

use crate::value::{first_bool, get_str};
use traceprint_core::{Finding, ProviderId, Severity, Timestamp};

/// Extract findings from an `abstract_email` payload.
#[must_use]
pub fn extract(provider: &ProviderId, payload: &serde_json::Value, observed_at: Timestamp) -> Vec<Finding> {
    let mut findings = Vec::new();

    if first_bool(payload, &["is_disposable_email", "disposable"]) == Some(true) {
        let mut finding = Finding::new(provider.clone(), "email.disposable", Severity::Medium, 0.9)
            .with_observed_at(observed_at);
        if let Some(autocorrect) = get_str(payload, "autocorrect") {
            finding = finding.with_metadata("autocorrect", autocorrect);
        }
        findings.push(finding);
    }

    if first_bool(payload, &["is_smtp_valid", "smtp_valid"]) == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "email.smtp_valid", Severity::Info, 0.9)
                .with_observed_at(observed_at),
        );
    }

    if first_bool(payload, &["is_mx_found", "mx_found"]) == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "email.mx_found", Severity::Info, 0.8)
                .with_observed_at(observed_at),
        );
    }

    if first_bool(payload, &["is_role_email", "role"]) == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "email.role", Severity::Low, 0.8)
                .with_observed_at(observed_at),
        );
    }

    if first_bool(payload, &["is_free_email", "free"]) == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "email.free_provider", Severity::Info, 0.7)
                .with_observed_at(observed_at),
        );
    }

    match get_str(payload, "deliverability") {
        Some("UNDELIVERABLE") => findings.push(
            Finding::new(provider.clone(), "email.undeliverable", Severity::Low, 0.8)
                .with_observed_at(observed_at),
        ),
        Some("DELIVERABLE") => findings.push(
            Finding::new(provider.clone(), "email.deliverable", Severity::Info, 0.8)
                .with_observed_at(observed_at),
        ),
        _ => {}
    }

    // Company/geo enrichment increases correlate-ability without being a
    // harm signal in itself; the scorer treats these as context.
    if let Some(company) = get_str(payload, "company.name") {
        findings.push(
            Finding::new(provider.clone(), "context.company", Severity::Info, 0.7)
                .with_evidence("company_name", company)
                .with_observed_at(observed_at),
        );
    }
    if let Some(country) = get_str(payload, "geolocation.country") {
        let mut finding = Finding::new(provider.clone(), "context.geolocation", Severity::Info, 0.6)
            .with_evidence("country", country)
            .with_observed_at(observed_at);
        if let Some(city) = get_str(payload, "geolocation.city") {
            finding = finding.with_evidence("city", city);
        }
        findings.push(finding);
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> ProviderId {
        ProviderId::new("abstract_email").expect("valid id")
    }

    #[test]
    fn test_disposable_envelope_extraction() {
        let payload = json!({
            "deliverability": "DELIVERABLE",
            "quality_score": "0.70",
            "is_disposable_email": {"value": true, "text": "TRUE"},
            "is_smtp_valid": {"value": false, "text": "FALSE"}
        });
        let findings = extract(&provider(), &payload, Timestamp::now());
        let kinds: Vec<_> = findings.iter().map(|f| f.kind.as_str()).collect();
        assert!(kinds.contains(&"email.disposable"));
        assert!(kinds.contains(&"email.deliverable"));
        assert!(!kinds.contains(&"email.smtp_valid"));
    }

    #[test]
    fn test_missing_fields_degrade_to_omitted() {
        let payload = json!({"unrelated": 1});
        let findings = extract(&provider(), &payload, Timestamp::now());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_company_context() {
        let payload = json!({
            "company": {"name": "Example Corp"},
            "geolocation": {"country": "DE", "city": "Berlin"}
        });
        let findings = extract(&provider(), &payload, Timestamp::now());
        assert_eq!(findings.len(), 2);
        let company = findings.iter().find(|f| f.kind == "context.company").expect("company");
        assert_eq!(company.evidence_value("company_name"), Some("Example Corp"));
    }
}
