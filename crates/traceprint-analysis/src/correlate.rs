//! Cross-provider finding correlation.
//!
//! Groups findings that plausibly describe the same account or signal:
//! presence findings by platform + normalized handle, metric findings by
//! kind, with groups linked when they surface the same normalized
//! secondary identifier as evidence. Group confidence is boosted when
//! independent providers agree and penalized when they conflict.
//!
//! The whole pass is order-insensitive: findings are sorted into a
//! canonical order first, so provider response order never changes the
//! output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use traceprint_core::{Finding, Severity};

/// Confidence boost per additional independent provider agreeing.
const AGREEMENT_BOOST: f64 = 0.1;
/// Confidence penalty applied to a conflicted group.
const CONFLICT_PENALTY: f64 = 0.2;
/// Group confidence ceiling; correlation never claims certainty.
const CONFIDENCE_CEILING: f64 = 0.99;

/// Kind pairs that assert opposite categorical facts.
const OPPOSING_KINDS: &[(&str, &str)] = &[
    ("email.deliverable", "email.undeliverable"),
    ("email.smtp_valid", "email.undeliverable"),
    ("phone.valid", "phone.invalid"),
];

/// Evidence keys that carry a secondary identifier linking groups.
const LINKING_KEYS: &[&str] = &[
    "linked_email",
    "email",
    "contact_email",
    "linked_phone",
    "phone",
    "contact_phone",
];

/// A set of findings judged to describe the same entity or signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationGroup {
    /// Member findings, in canonical order
    pub findings: Vec<Finding>,
    /// Combined confidence for the group, 0.0-1.0
    pub confidence: f64,
    /// True when two data points assert opposite categorical facts
    pub conflicting: bool,
}

impl CorrelationGroup {
    /// Highest member severity, or `Info` for an empty group.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.findings
            .iter()
            .map(|f| f.severity)
            .max_by_key(Severity::rank)
            .unwrap_or(Severity::Info)
    }

    /// Number of distinct providers contributing to the group.
    #[must_use]
    pub fn provider_count(&self) -> usize {
        distinct_providers(&self.findings)
    }

    /// The kinds represented in this group, deduplicated.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.findings.iter().map(|f| f.kind.as_str()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }
}

/// Group a session's findings into correlation groups.
///
/// All input findings concern the same scanned identifier; the grouping
/// distinguishes which of them describe the same *account or signal*:
///
/// - presence findings (`profile.presence`, `account.registered`) are
///   deduplicated by platform plus normalized handle/URL,
/// - other findings group by kind,
/// - groups sharing a normalized secondary-identifier evidence value
///   (an email surfaced by a phone lookup, say) are merged,
/// - same provider + kind disagreeing on an evidence value resolves
///   most-recent-wins before grouping,
/// - opposing categorical kinds from exactly two sources merge into one
///   group flagged `conflicting`; with three or more sources a strict
///   majority resolves the conflict instead.
#[must_use]
pub fn correlate(findings: Vec<Finding>) -> Vec<CorrelationGroup> {
    let findings = canonical_order(resolve_provider_repeats(findings));

    // Initial partition
    let mut groups: Vec<Vec<Finding>> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    for finding in findings {
        let key = group_key(&finding);
        if let Some(&slot) = index.get(&key) {
            groups[slot].push(finding);
        } else {
            index.insert(key, groups.len());
            groups.push(vec![finding]);
        }
    }

    merge_linked_groups(&mut groups);
    let conflicted = resolve_opposing_kinds(&mut groups);

    let mut out: Vec<CorrelationGroup> = groups
        .into_iter()
        .enumerate()
        .filter(|(_, members)| !members.is_empty())
        .map(|(slot, members)| build_group(members, conflicted.contains(&slot)))
        .collect();

    // Canonical group order keeps the pass commutative end to end
    out.sort_by(|a, b| {
        let ka = a.findings.first().map(|f| (&f.kind, &f.provider));
        let kb = b.findings.first().map(|f| (&f.kind, &f.provider));
        ka.cmp(&kb)
    });
    out
}

fn build_group(members: Vec<Finding>, conflicting: bool) -> CorrelationGroup {
    let base = members
        .iter()
        .map(|f| f.confidence)
        .fold(0.0_f64, f64::max);

    let agreement =
        AGREEMENT_BOOST * (distinct_providers(&members).saturating_sub(1)) as f64;

    let mut confidence = (base + agreement).min(CONFIDENCE_CEILING);
    if conflicting {
        confidence = (confidence - CONFLICT_PENALTY).max(0.0);
    }

    CorrelationGroup {
        findings: members,
        confidence,
        conflicting,
    }
}

fn distinct_providers(members: &[Finding]) -> usize {
    let mut providers: Vec<_> = members.iter().map(|f| &f.provider).collect();
    providers.sort();
    providers.dedup();
    providers.len()
}

/// Same provider + kind disagreeing on an evidence value: keep the most
/// recently observed finding, drop the older ones.
fn resolve_provider_repeats(findings: Vec<Finding>) -> Vec<Finding> {
    let mut latest: BTreeMap<(String, String), Finding> = BTreeMap::new();
    let mut passthrough = Vec::new();

    for finding in findings {
        if finding.evidence.is_empty() {
            // Nothing to conflict on; identical repeats collapse via grouping
            passthrough.push(finding);
            continue;
        }
        let key = (finding.provider.to_string(), finding.kind.clone());
        match latest.get(&key) {
            Some(existing) if existing.evidence == finding.evidence => {
                passthrough.push(finding);
            }
            Some(existing) if existing.observed_at >= finding.observed_at => {}
            _ => {
                latest.insert(key, finding);
            }
        }
    }

    passthrough.extend(latest.into_values());
    passthrough
}

fn canonical_order(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        (&a.kind, &a.provider, &a.observed_at, &a.evidence)
            .cmp(&(&b.kind, &b.provider, &b.observed_at, &b.evidence))
    });
    findings
}

fn group_key(finding: &Finding) -> String {
    match finding.kind.as_str() {
        "profile.presence" | "account.registered" => {
            let platform = finding
                .evidence_value("platform")
                .or_else(|| finding.evidence_value("domain"))
                .unwrap_or("")
                .to_lowercase();
            let handle = finding
                .evidence_value("username")
                .map(str::to_lowercase)
                .or_else(|| finding.evidence_value("profile_url").map(normalize_url))
                .unwrap_or_default();
            format!("presence:{platform}:{handle}")
        }
        kind => format!("kind:{kind}"),
    }
}

fn normalize_url(url: &str) -> String {
    url.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .trim_end_matches('/')
        .to_lowercase()
}

/// Merge groups that surface the same normalized secondary identifier.
fn merge_linked_groups(groups: &mut Vec<Vec<Finding>>) {
    let mut by_link: BTreeMap<String, usize> = BTreeMap::new();
    for slot in 0..groups.len() {
        let links: Vec<String> = groups[slot]
            .iter()
            .flat_map(|f| f.evidence.iter())
            .filter(|e| LINKING_KEYS.contains(&e.key.as_str()))
            .map(|e| e.value.trim().to_lowercase())
            .collect();

        for link in links {
            if let Some(&target) = by_link.get(&link) {
                if target != slot {
                    let members = std::mem::take(&mut groups[slot]);
                    groups[target].extend(members);
                }
            } else {
                by_link.insert(link, slot);
            }
        }
    }
    groups.retain(|g| !g.is_empty());
}

/// Handle opposing categorical kinds. Returns the slots flagged conflicting.
///
/// Two data points disagreeing is never resolved by vote; the merged group
/// is flagged and the scorer leaves those kinds out. Three or more data
/// points resolve by strict majority, with ties flagged like the two-point
/// case.
fn resolve_opposing_kinds(groups: &mut Vec<Vec<Finding>>) -> Vec<usize> {
    let mut conflicted = Vec::new();

    for (kind_a, kind_b) in OPPOSING_KINDS {
        let slot_a = groups
            .iter()
            .position(|g| g.iter().any(|f| f.kind == *kind_a));
        let slot_b = groups
            .iter()
            .position(|g| g.iter().any(|f| f.kind == *kind_b));
        let (Some(slot_a), Some(slot_b)) = (slot_a, slot_b) else {
            continue;
        };
        if slot_a == slot_b {
            continue;
        }

        // A vote is an independent provider, not a finding: one provider
        // repeating itself never outweighs a dissenting source.
        let votes_a = distinct_providers(&groups[slot_a]);
        let votes_b = distinct_providers(&groups[slot_b]);
        let total = votes_a + votes_b;

        if total >= 3 && votes_a != votes_b {
            // Strict majority: drop the minority claim
            let loser = if votes_a > votes_b { slot_b } else { slot_a };
            tracing::debug!(
                kind_a, kind_b, votes_a, votes_b,
                "majority resolved opposing kinds"
            );
            groups[loser].clear();
        } else {
            // Two points (or a tie): merge and flag, never vote
            let members = std::mem::take(&mut groups[slot_b]);
            groups[slot_a].extend(members);
            conflicted.push(slot_a);
            tracing::debug!(kind_a, kind_b, "flagged conflicting categorical kinds");
        }
    }

    // Re-index after clears, preserving the conflicted markers
    let mut remapped = Vec::new();
    let mut next = 0;
    for (slot, group) in groups.iter().enumerate() {
        if !group.is_empty() {
            if conflicted.contains(&slot) {
                remapped.push(next);
            }
            next += 1;
        }
    }
    groups.retain(|g| !g.is_empty());
    remapped
}
