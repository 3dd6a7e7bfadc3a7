//! Exposure scoring.
//!
//! Each populated category starts at a neutral baseline of 50 and moves
//! by a fixed additive delta per finding kind, clamped to [0, 100]. The
//! overall score is the credit-weighted combination of populated category
//! sub-scores plus a small bonus for identity-context findings, and maps
//! onto a fixed tier table. The whole computation is a pure fold over
//! immutable correlation groups; same groups, same score.

use crate::correlate::CorrelationGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Neutral starting point for a populated category.
const CATEGORY_BASELINE: f64 = 50.0;
/// Bonus when company-context findings are present.
const COMPANY_CONTEXT_BONUS: f64 = 5.0;
/// Bonus when geolocation-context findings are present.
const GEO_CONTEXT_BONUS: f64 = 3.0;

/// Scoring category a finding kind falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    /// Email validity/exposure signals
    Email,
    /// Phone line and carrier signals
    Phone,
    /// IP reputation signals
    Ip,
    /// Dark-web and URL exposure signals
    Darkweb,
    /// Social and account presence signals
    Social,
}

impl ScoreCategory {
    /// Map a finding kind to its scoring category.
    ///
    /// Context kinds (`context.*`) feed the bonus instead and return `None`.
    #[must_use]
    pub fn for_kind(kind: &str) -> Option<Self> {
        match kind.split('.').next()? {
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "ip" => Some(Self::Ip),
            "darkweb" | "url" => Some(Self::Darkweb),
            "profile" | "account" | "messaging" | "social" | "broker" => Some(Self::Social),
            _ => None,
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Ip => "ip",
            Self::Darkweb => "darkweb",
            Self::Social => "social",
        };
        write!(f, "{label}")
    }
}

/// Fixed additive delta for a finding kind. Unknown kinds contribute 0.
#[must_use]
pub fn kind_delta(kind: &str) -> f64 {
    match kind {
        // Email
        "email.smtp_valid" => 10.0,
        "email.deliverable" => 5.0,
        "email.mx_found" => 5.0,
        "email.free_provider" => 0.0,
        "email.role" => -5.0,
        "email.honeypot" => -5.0,
        "email.undeliverable" => -10.0,
        "email.recent_abuse" => -10.0,
        "email.disposable" => -15.0,
        "email.leaked" => -20.0,
        // Phone
        "phone.valid" => 5.0,
        "phone.active" => 5.0,
        "phone.invalid" => -10.0,
        "phone.linked_account" => -5.0,
        "phone.voip" => -10.0,
        "phone.risky" => -15.0,
        "phone.leaked" => -20.0,
        // IP
        "ip.vpn" | "ip.proxy" => -10.0,
        "ip.high_fraud_score" => -10.0,
        "ip.recent_abuse" => -15.0,
        "ip.tor" => -20.0,
        // Dark web / URL
        "darkweb.breach" => -10.0,
        "darkweb.exposure" => -15.0,
        "darkweb.breach_with_passwords" => -20.0,
        "darkweb.plaintext_password" => -25.0,
        "url.suspicious" => -10.0,
        "url.phishing" | "url.malware" => -30.0,
        // Social / presence
        "messaging.registered" => -2.0,
        "profile.presence" | "account.registered" => -3.0,
        "broker.listing" => -10.0,
        _ => 0.0,
    }
}

/// Per-category weights for the overall combination.
///
/// Weights track the credit cost of the providers feeding each category:
/// dark-web lookups are the most expensive signals and carry the most
/// weight, presence enumeration the least.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWeights(BTreeMap<ScoreCategory, f64>);

impl CategoryWeights {
    /// Weight for a category (defaults to 1.0 if unset).
    #[must_use]
    pub fn weight(&self, category: ScoreCategory) -> f64 {
        self.0.get(&category).copied().unwrap_or(1.0)
    }

    /// Override one category's weight (builder style).
    #[must_use]
    pub fn with_weight(mut self, category: ScoreCategory, weight: f64) -> Self {
        self.0.insert(category, weight.max(0.0));
        self
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(ScoreCategory::Email, 2.0);
        weights.insert(ScoreCategory::Phone, 2.0);
        weights.insert(ScoreCategory::Ip, 2.0);
        weights.insert(ScoreCategory::Darkweb, 3.0);
        weights.insert(ScoreCategory::Social, 1.0);
        Self(weights)
    }
}

/// Qualitative tier for an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// 0-24
    Low,
    /// 25-49
    Moderate,
    /// 50-74
    High,
    /// 75-100
    Severe,
}

impl Tier {
    /// Classify a 0-100 score. Thresholds are fixed at 24/49/74.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => Self::Low,
            25..=49 => Self::Moderate,
            50..=74 => Self::High,
            _ => Self::Severe,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Severe => "severe",
        };
        write!(f, "{label}")
    }
}

/// The final exposure assessment for one scan session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureScore {
    /// Overall score, 0-100
    pub overall: u8,
    /// Qualitative tier
    pub tier: Tier,
    /// Populated category sub-scores
    pub categories: BTreeMap<ScoreCategory, u8>,
    /// Kinds that contributed to the score, in canonical order
    pub contributing_kinds: Vec<String>,
    /// Kinds excluded because their groups were conflicted
    pub conflicted_kinds: Vec<String>,
}

/// Compute the exposure score from correlation groups.
///
/// Conflicted groups contribute nothing: a two-way categorical
/// disagreement is reported, not scored. With no populated categories at
/// all there is no measured exposure; the overall reports 0 and tier
/// `low` rather than the per-category neutral baseline.
#[must_use]
pub fn score(groups: &[CorrelationGroup], weights: &CategoryWeights) -> ExposureScore {
    let mut category_totals: BTreeMap<ScoreCategory, f64> = BTreeMap::new();
    let mut contributing_kinds: Vec<String> = Vec::new();
    let mut conflicted_kinds: Vec<String> = Vec::new();
    let mut company_context = false;
    let mut geo_context = false;

    for group in groups {
        if group.conflicting {
            conflicted_kinds.extend(group.kinds().iter().map(ToString::to_string));
            continue;
        }
        for finding in &group.findings {
            match finding.kind.as_str() {
                "context.company" => {
                    company_context = true;
                    continue;
                }
                "context.geolocation" => {
                    geo_context = true;
                    continue;
                }
                _ => {}
            }
            let Some(category) = ScoreCategory::for_kind(&finding.kind) else {
                continue;
            };
            *category_totals.entry(category).or_insert(CATEGORY_BASELINE) +=
                kind_delta(&finding.kind);
            contributing_kinds.push(finding.kind.clone());
        }
    }

    contributing_kinds.sort_unstable();
    contributing_kinds.dedup();
    conflicted_kinds.sort_unstable();
    conflicted_kinds.dedup();

    let categories: BTreeMap<ScoreCategory, u8> = category_totals
        .iter()
        .map(|(category, total)| (*category, clamp_score(*total)))
        .collect();

    let overall = if categories.is_empty() {
        0
    } else {
        let weight_sum: f64 = categories
            .keys()
            .map(|category| weights.weight(*category))
            .sum();
        let weighted: f64 = categories
            .iter()
            .map(|(category, sub)| weights.weight(*category) * f64::from(*sub))
            .sum();
        let mut overall = weighted / weight_sum;
        if company_context {
            overall += COMPANY_CONTEXT_BONUS;
        }
        if geo_context {
            overall += GEO_CONTEXT_BONUS;
        }
        clamp_score(overall)
    };

    let tier = Tier::from_score(overall);
    tracing::debug!(overall, %tier, categories = categories.len(), "computed exposure score");

    ExposureScore {
        overall,
        tier,
        categories,
        contributing_kinds,
        conflicted_kinds,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::correlate;
    use traceprint_core::{Finding, ProviderId, Severity};

    fn provider(id: &str) -> ProviderId {
        ProviderId::new(id).expect("valid id")
    }

    fn groups_of(findings: Vec<Finding>) -> Vec<CorrelationGroup> {
        correlate(findings)
    }

    #[test]
    fn test_tier_boundaries_literal() {
        assert_eq!(Tier::from_score(0), Tier::Low);
        assert_eq!(Tier::from_score(24), Tier::Low);
        assert_eq!(Tier::from_score(25), Tier::Moderate);
        assert_eq!(Tier::from_score(49), Tier::Moderate);
        assert_eq!(Tier::from_score(50), Tier::High);
        assert_eq!(Tier::from_score(74), Tier::High);
        assert_eq!(Tier::from_score(75), Tier::Severe);
        assert_eq!(Tier::from_score(100), Tier::Severe);
    }

    #[test]
    fn test_zero_findings_reports_no_exposure() {
        let result = score(&[], &CategoryWeights::default());
        assert_eq!(result.overall, 0);
        assert_eq!(result.tier, Tier::Low);
        assert!(result.categories.is_empty());
    }

    #[test]
    fn test_single_disposable_email_is_35_moderate() {
        let groups = groups_of(vec![Finding::new(
            provider("abstract_email"),
            "email.disposable",
            Severity::Medium,
            0.9,
        )]);
        let result = score(&groups, &CategoryWeights::default());
        assert_eq!(result.categories.get(&ScoreCategory::Email), Some(&35));
        assert_eq!(result.overall, 35);
        assert_eq!(result.tier, Tier::Moderate);
    }

    #[test]
    fn test_category_clamped_to_bounds() {
        let groups = groups_of(vec![
            Finding::new(provider("ipqs_darkweb"), "darkweb.plaintext_password", Severity::Critical, 1.0),
            Finding::new(provider("hibp"), "darkweb.breach_with_passwords", Severity::High, 0.9),
            Finding::new(provider("hibp"), "darkweb.breach", Severity::Medium, 0.9)
                .with_evidence("breach_name", "Forum"),
            Finding::new(provider("ipqs_darkweb"), "darkweb.exposure", Severity::High, 0.9),
        ]);
        let result = score(&groups, &CategoryWeights::default());
        // 50 - 25 - 20 - 10 - 15 = -20, clamped to 0
        assert_eq!(result.categories.get(&ScoreCategory::Darkweb), Some(&0));
        assert_eq!(result.tier, Tier::Low);
    }

    #[test]
    fn test_unpopulated_categories_do_not_dilute() {
        // Only the dark-web category is populated; email/phone/ip absence
        // must not drag the overall toward a false neutral.
        let groups = groups_of(vec![Finding::new(
            provider("ipqs_darkweb"),
            "darkweb.plaintext_password",
            Severity::Critical,
            1.0,
        )]);
        let result = score(&groups, &CategoryWeights::default());
        assert_eq!(result.overall, 25);
        assert_eq!(result.categories.len(), 1);
    }

    #[test]
    fn test_credit_weighted_combination() {
        let groups = groups_of(vec![
            Finding::new(provider("abstract_email"), "email.disposable", Severity::Medium, 0.9),
            Finding::new(provider("ipqs_darkweb"), "darkweb.plaintext_password", Severity::Critical, 1.0),
        ]);
        let result = score(&groups, &CategoryWeights::default());
        // email 35 (weight 2), darkweb 25 (weight 3) -> (70 + 75) / 5 = 29
        assert_eq!(result.overall, 29);
        assert_eq!(result.tier, Tier::Moderate);
    }

    #[test]
    fn test_context_bonus_applied() {
        let groups = groups_of(vec![
            Finding::new(provider("abstract_email"), "email.smtp_valid", Severity::Info, 0.9),
            Finding::new(provider("abstract_email"), "context.company", Severity::Info, 0.7)
                .with_evidence("company_name", "Example Corp"),
            Finding::new(provider("ipqs_ip"), "context.geolocation", Severity::Info, 0.7)
                .with_evidence("country", "DE"),
        ]);
        let result = score(&groups, &CategoryWeights::default());
        // email 60, + company 5 + geo 3
        assert_eq!(result.overall, 68);
        assert_eq!(result.tier, Tier::High);
    }

    #[test]
    fn test_context_bonus_needs_populated_category() {
        // Context alone measures nothing
        let groups = groups_of(vec![Finding::new(
            provider("abstract_email"),
            "context.company",
            Severity::Info,
            0.7,
        )]);
        let result = score(&groups, &CategoryWeights::default());
        assert_eq!(result.overall, 0);
        assert_eq!(result.tier, Tier::Low);
    }

    #[test]
    fn test_conflicted_kinds_excluded() {
        let groups = groups_of(vec![
            Finding::new(provider("abstract_email"), "email.deliverable", Severity::Info, 0.8),
            Finding::new(provider("ipqs_email"), "email.undeliverable", Severity::Low, 0.8),
            Finding::new(provider("ipqs_phone"), "phone.voip", Severity::Medium, 0.8),
        ]);
        let result = score(&groups, &CategoryWeights::default());
        assert!(result.conflicted_kinds.contains(&"email.deliverable".to_string()));
        assert!(result.conflicted_kinds.contains(&"email.undeliverable".to_string()));
        // Only the phone category scores
        assert_eq!(result.categories.len(), 1);
        assert_eq!(result.categories.get(&ScoreCategory::Phone), Some(&40));
    }

    #[test]
    fn test_conflicting_phone_validity_not_scored() {
        // Two providers disagreeing on validity with no third source:
        // the conflict is reported, the phone category stays unpopulated.
        let groups = groups_of(vec![
            Finding::new(provider("ipqs_phone"), "phone.valid", Severity::Info, 0.8),
            Finding::new(provider("carrier_check"), "phone.invalid", Severity::Low, 0.8),
        ]);
        let result = score(&groups, &CategoryWeights::default());
        assert!(result.conflicted_kinds.contains(&"phone.valid".to_string()));
        assert!(result.conflicted_kinds.contains(&"phone.invalid".to_string()));
        assert!(result.categories.is_empty());
        assert_eq!(result.overall, 0);
    }

    #[test]
    fn test_deterministic() {
        let findings = vec![
            Finding::new(provider("abstract_email"), "email.disposable", Severity::Medium, 0.9),
            Finding::new(provider("ipqs_ip"), "ip.tor", Severity::High, 0.9),
        ];
        let a = score(&groups_of(findings.clone()), &CategoryWeights::default());
        let b = score(&groups_of(findings), &CategoryWeights::default());
        assert_eq!(a.overall, b.overall);
        assert_eq!(a.contributing_kinds, b.contributing_kinds);
    }
}
