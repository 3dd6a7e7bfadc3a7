//! Extraction rules for presence-style providers.
//!
//! Username enumerators (maigret, sherlock), account-discovery tools
//! (holehe), messaging presence checks, and broker-index lookups all
//! reduce to "this identifier exists over there" findings.

use crate::value::{first_of, get_bool, get_str};
use traceprint_core::{Finding, ProviderId, Severity, Timestamp};

/// Extract `profile.presence` findings from a username enumerator payload.
///
/// Both maigret and sherlock report a list of hits; maigret's site
/// metadata is richer, which is reflected in a higher per-hit confidence.
#[must_use]
pub fn extract_profiles(
    provider: &ProviderId,
    payload: &serde_json::Value,
    observed_at: Timestamp,
) -> Vec<Finding> {
    let confidence = if provider.as_str() == "maigret" { 0.7 } else { 0.6 };

    let Some(sites) = first_of(payload, &["sites", "found", "results"]).and_then(|v| v.as_array())
    else {
        return Vec::new();
    };

    sites
        .iter()
        .filter_map(|site| {
            let platform = get_str(site, "site").or_else(|| get_str(site, "platform"))?;
            let mut finding =
                Finding::new(provider.clone(), "profile.presence", Severity::Low, confidence)
                    .with_evidence("platform", platform)
                    .with_observed_at(observed_at);
            if let Some(url) = get_str(site, "url") {
                finding = finding.with_evidence("profile_url", url);
            }
            if let Some(username) = get_str(site, "username") {
                finding = finding.with_evidence("username", username);
            }
            Some(finding)
        })
        .collect()
}

/// Extract `account.registered` findings from a holehe payload.
#[must_use]
pub fn extract_accounts(
    provider: &ProviderId,
    payload: &serde_json::Value,
    observed_at: Timestamp,
) -> Vec<Finding> {
    let Some(accounts) = first_of(payload, &["accounts", "results"]).and_then(|v| v.as_array())
    else {
        return Vec::new();
    };

    accounts
        .iter()
        .filter(|account| get_bool(account, "exists") == Some(true))
        .filter_map(|account| {
            let domain = get_str(account, "domain")?;
            Some(
                Finding::new(provider.clone(), "account.registered", Severity::Low, 0.7)
                    .with_evidence("domain", domain)
                    .with_observed_at(observed_at),
            )
        })
        .collect()
}

/// Extract a `messaging.registered` finding from a presence-check payload.
#[must_use]
pub fn extract_messaging(
    provider: &ProviderId,
    payload: &serde_json::Value,
    observed_at: Timestamp,
) -> Vec<Finding> {
    if get_bool(payload, "registered") == Some(true) {
        let mut finding =
            Finding::new(provider.clone(), "messaging.registered", Severity::Low, 0.8)
                .with_observed_at(observed_at);
        if let Some(platform) = get_str(payload, "platform") {
            finding = finding.with_evidence("platform", platform);
        }
        vec![finding]
    } else {
        Vec::new()
    }
}

/// Extract `broker.listing` findings from a broker-index payload.
#[must_use]
pub fn extract_listings(
    provider: &ProviderId,
    payload: &serde_json::Value,
    observed_at: Timestamp,
) -> Vec<Finding> {
    let Some(listings) = first_of(payload, &["listings", "records"]).and_then(|v| v.as_array())
    else {
        return Vec::new();
    };

    listings
        .iter()
        .filter_map(|listing| {
            let broker = get_str(listing, "broker")?;
            let mut finding =
                Finding::new(provider.clone(), "broker.listing", Severity::Medium, 0.7)
                    .with_evidence("broker", broker)
                    .with_observed_at(observed_at);
            if let Some(url) = get_str(listing, "url") {
                finding = finding.with_evidence("listing_url", url);
            }
            Some(finding)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(id: &str) -> ProviderId {
        ProviderId::new(id).expect("valid id")
    }

    #[test]
    fn test_profiles_extraction() {
        let payload = json!({
            "sites": [
                {"site": "GitHub", "url": "https://github.com/janedoe", "username": "janedoe"},
                {"site": "Mastodon"},
                {"no_site_key": true}
            ]
        });
        let findings = extract_profiles(&provider("maigret"), &payload, Timestamp::now());
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].evidence_value("platform"), Some("GitHub"));
        assert!((findings[0].confidence - 0.7).abs() < f64::EPSILON);

        let findings = extract_profiles(&provider("sherlock"), &payload, Timestamp::now());
        assert!((findings[0].confidence - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_accounts_only_existing() {
        let payload = json!({
            "accounts": [
                {"domain": "spotify.com", "exists": true},
                {"domain": "github.com", "exists": false}
            ]
        });
        let findings = extract_accounts(&provider("holehe"), &payload, Timestamp::now());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence_value("domain"), Some("spotify.com"));
    }

    #[test]
    fn test_messaging_negative_yields_nothing() {
        let payload = json!({"registered": false});
        let findings =
            extract_messaging(&provider("whatsapp_presence"), &payload, Timestamp::now());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_listings() {
        let payload = json!({"listings": [{"broker": "spokeo", "url": "https://example.com/x"}]});
        let findings = extract_listings(&provider("broker_index"), &payload, Timestamp::now());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, "broker.listing");
    }
}
