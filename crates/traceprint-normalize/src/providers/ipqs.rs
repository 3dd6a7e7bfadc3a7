//! Extraction rules for the IPQS (IPQualityScore) payload family.
//!
//! IPQS serves email, phone, IP, and dark-web endpoints with overlapping
//! but not identical shapes. One module handles all four; the caller
//! picks the entry point by provider ID.

use crate::value::{first_bool, get_array, get_bool, get_f64, get_str};
use traceprint_core::{Finding, ProviderId, Severity, Timestamp};

/// Fraud score at or above this is itself a signal.
const FRAUD_SCORE_FLOOR: f64 = 85.0;

/// Extract findings from an `ipqs_email` payload.
#[must_use]
pub fn extract_email(
    provider: &ProviderId,
    payload: &serde_json::Value,
    observed_at: Timestamp,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    if get_bool(payload, "leaked") == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "email.leaked", Severity::High, 0.9)
                .with_observed_at(observed_at),
        );
    }
    if get_bool(payload, "disposable") == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "email.disposable", Severity::Medium, 0.9)
                .with_observed_at(observed_at),
        );
    }
    if get_bool(payload, "honeypot") == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "email.honeypot", Severity::Low, 0.8)
                .with_observed_at(observed_at),
        );
    }
    if get_bool(payload, "recent_abuse") == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "email.recent_abuse", Severity::Medium, 0.8)
                .with_observed_at(observed_at),
        );
    }
    if get_bool(payload, "valid") == Some(true) && get_bool(payload, "smtp_score").is_none() {
        findings.push(
            Finding::new(provider.clone(), "email.deliverable", Severity::Info, 0.8)
                .with_observed_at(observed_at),
        );
    }

    findings
}

/// Extract findings from an `ipqs_phone` payload.
#[must_use]
pub fn extract_phone(
    provider: &ProviderId,
    payload: &serde_json::Value,
    observed_at: Timestamp,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    // Validity is a first-class categorical claim; both polarities are
    // findings so disagreeing providers can be correlated against each other.
    match get_bool(payload, "valid") {
        Some(true) => findings.push(
            Finding::new(provider.clone(), "phone.valid", Severity::Info, 0.8)
                .with_observed_at(observed_at),
        ),
        Some(false) => findings.push(
            Finding::new(provider.clone(), "phone.invalid", Severity::Low, 0.8)
                .with_observed_at(observed_at),
        ),
        None => {}
    }
    if get_bool(payload, "leaked") == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "phone.leaked", Severity::High, 0.9)
                .with_observed_at(observed_at),
        );
    }
    if get_bool(payload, "risky") == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "phone.risky", Severity::Medium, 0.8)
                .with_observed_at(observed_at),
        );
    }
    if get_str(payload, "line_type").is_some_and(|t| t.eq_ignore_ascii_case("voip")) {
        findings.push(
            Finding::new(provider.clone(), "phone.voip", Severity::Medium, 0.8)
                .with_observed_at(observed_at),
        );
    }
    if get_bool(payload, "active") == Some(true) {
        let mut finding = Finding::new(provider.clone(), "phone.active", Severity::Info, 0.8)
            .with_observed_at(observed_at);
        if let Some(carrier) = get_str(payload, "carrier") {
            finding = finding.with_evidence("carrier", carrier);
        }
        findings.push(finding);
    }

    // Linked accounts surfaced by the lookup feed the correlation pass.
    if let Some(emails) = get_array(payload, "associated_email_addresses.emails") {
        for email in emails.iter().filter_map(serde_json::Value::as_str) {
            findings.push(
                Finding::new(provider.clone(), "phone.linked_account", Severity::Low, 0.6)
                    .with_evidence("linked_email", email)
                    .with_observed_at(observed_at),
            );
        }
    }

    findings
}

/// Extract findings from an `ipqs_ip` payload.
#[must_use]
pub fn extract_ip(
    provider: &ProviderId,
    payload: &serde_json::Value,
    observed_at: Timestamp,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    if first_bool(payload, &["tor", "active_tor"]) == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "ip.tor", Severity::High, 0.9)
                .with_observed_at(observed_at),
        );
    }
    if first_bool(payload, &["vpn", "active_vpn"]) == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "ip.vpn", Severity::Medium, 0.8)
                .with_observed_at(observed_at),
        );
    }
    if get_bool(payload, "proxy") == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "ip.proxy", Severity::Medium, 0.8)
                .with_observed_at(observed_at),
        );
    }
    if get_bool(payload, "recent_abuse") == Some(true) {
        findings.push(
            Finding::new(provider.clone(), "ip.recent_abuse", Severity::Medium, 0.8)
                .with_observed_at(observed_at),
        );
    }
    if get_f64(payload, "fraud_score").is_some_and(|s| s >= FRAUD_SCORE_FLOOR) {
        findings.push(
            Finding::new(provider.clone(), "ip.high_fraud_score", Severity::Medium, 0.7)
                .with_observed_at(observed_at),
        );
    }
    if let Some(country) = get_str(payload, "country_code") {
        let mut finding = Finding::new(provider.clone(), "context.geolocation", Severity::Info, 0.7)
            .with_evidence("country", country)
            .with_observed_at(observed_at);
        if let Some(city) = get_str(payload, "city") {
            finding = finding.with_evidence("city", city);
        }
        findings.push(finding);
    }

    findings
}

/// Extract findings from an `ipqs_darkweb` payload.
#[must_use]
pub fn extract_darkweb(
    provider: &ProviderId,
    payload: &serde_json::Value,
    observed_at: Timestamp,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let Some(exposures) = get_array(payload, "exposures").or_else(|| get_array(payload, "sources"))
    else {
        return findings;
    };

    for exposure in exposures {
        let plaintext = get_bool(exposure, "plain_text_password") == Some(true);
        let (kind, severity, confidence) = if plaintext {
            ("darkweb.plaintext_password", Severity::Critical, 1.0)
        } else {
            ("darkweb.exposure", Severity::High, 0.9)
        };
        let mut finding = Finding::new(provider.clone(), kind, severity, confidence)
            .with_observed_at(observed_at);
        if let Some(source) = get_str(exposure, "source") {
            finding = finding.with_evidence("source", source);
        }
        if let Some(first_seen) = get_str(exposure, "first_seen.human") {
            finding = finding.with_metadata("first_seen", first_seen);
        }
        findings.push(finding);
    }

    findings
}
