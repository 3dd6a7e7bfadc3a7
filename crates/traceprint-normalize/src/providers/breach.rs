//! Extraction rules for breach-corpus lookups (HIBP payload shape).

use crate::value::{first_of, get_str};
use traceprint_core::{Finding, ProviderId, Severity, Timestamp};

/// Extract breach findings from an HIBP-style payload.
///
/// One finding per breach. A breach whose data classes include passwords
/// is a dark-web-grade exposure; anything else is a plain breach record.
#[must_use]
pub fn extract(
    provider: &ProviderId,
    payload: &serde_json::Value,
    observed_at: Timestamp,
) -> Vec<Finding> {
    let Some(breaches) = first_of(payload, &["breaches", "Breaches"]).and_then(|v| v.as_array())
    else {
        return Vec::new();
    };

    breaches
        .iter()
        .filter_map(|breach| {
            let name = get_str(breach, "Name").or_else(|| get_str(breach, "name"))?;
            let classes: Vec<&str> = first_of(breach, &["DataClasses", "data_classes"])
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(serde_json::Value::as_str).collect())
                .unwrap_or_default();
            let has_passwords = classes.iter().any(|c| c.eq_ignore_ascii_case("passwords"));

            let (kind, severity) = if has_passwords {
                ("darkweb.breach_with_passwords", Severity::High)
            } else {
                ("darkweb.breach", Severity::Medium)
            };

            let mut finding = Finding::new(provider.clone(), kind, severity, 0.9)
                .with_evidence("breach_name", name)
                .with_observed_at(observed_at);
            if let Some(date) = get_str(breach, "BreachDate").or_else(|| get_str(breach, "breach_date")) {
                finding = finding.with_metadata("breach_date", date);
            }
            if !classes.is_empty() {
                finding = finding.with_metadata("data_classes", classes.join(","));
            }
            Some(finding)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> ProviderId {
        ProviderId::new("hibp").expect("valid id")
    }

    #[test]
    fn test_breach_with_passwords_is_high() {
        let payload = json!({
            "breaches": [
                {
                    "Name": "Adobe",
                    "BreachDate": "2013-10-04",
                    "DataClasses": ["Email addresses", "Passwords"]
                },
                {"Name": "Forum", "DataClasses": ["Email addresses"]}
            ]
        });
        let findings = extract(&provider(), &payload, Timestamp::now());
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind, "darkweb.breach_with_passwords");
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].evidence_value("breach_name"), Some("Adobe"));
        assert_eq!(findings[1].kind, "darkweb.breach");
    }

    #[test]
    fn test_empty_payload_yields_nothing() {
        let findings = extract(&provider(), &json!({}), Timestamp::now());
        assert!(findings.is_empty());
    }
}
