//! Shared types used across the Traceprint engine.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling. Identifier values are personal data: their
//! `Display` implementations emit masked forms so accidental logging never
//! leaks the raw value.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::sync::OnceLock;

/// Newtype for scan session identifiers with validation.
///
/// Session IDs must be valid UUIDs (v4 format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new `SessionId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not a valid UUID v4.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a new random `SessionId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), CoreError> {
        static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = UUID_REGEX.get_or_init(|| {
            Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
                .expect("valid regex")
        });

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid session ID: must be a valid UUID v4, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for provider identifiers with validation.
///
/// Provider IDs must be lowercase alphanumeric with hyphens or underscores,
/// 3-50 characters (e.g. `ipqs_email`, `maigret`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create a new `ProviderId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), CoreError> {
        static PROVIDER_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PROVIDER_REGEX.get_or_init(|| {
            Regex::new(r"^[a-z0-9][a-z0-9_-]{1,48}[a-z0-9]$").expect("valid regex")
        });

        if id.len() < 3 || id.len() > 50 {
            return Err(CoreError::Validation(format!(
                "invalid provider ID: must be 3-50 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid provider ID: must be lowercase alphanumeric with hyphens or underscores, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for workspace (tenant) identifiers.
///
/// Workspace IDs are opaque to the engine but must be non-empty,
/// at most 64 characters, and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Create a new `WorkspaceId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty, too long, or contains whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() || id.len() > 64 {
            return Err(CoreError::Validation(format!(
                "invalid workspace ID: must be 1-64 characters, got {} characters",
                id.len()
            )));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(CoreError::Validation(
                "invalid workspace ID: must not contain whitespace".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of identifier a scan targets.
///
/// Providers declare which identifier types they accept; the dispatcher
/// filters by capability before invoking anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    /// A social/platform username or handle
    Username,
    /// An email address
    Email,
    /// A phone number (E.164 or national digits)
    Phone,
    /// An IPv4 or IPv6 address
    Ip,
}

impl IdentifierType {
    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Ip => "IP Address",
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A validated, canonicalized scan target.
///
/// Construction canonicalizes the value (emails lowercased, phone numbers
/// reduced to `+`/digits, IPs reparsed to canonical text) so identifier
/// equality is meaningful across providers. `Display` is masked; use
/// [`Identifier::value`] where the raw value is genuinely needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    kind: IdentifierType,
    value: String,
}

impl Identifier {
    /// Create a validated identifier.
    ///
    /// # Errors
    /// Returns error if the value does not parse as the given type.
    pub fn new(kind: IdentifierType, value: impl Into<String>) -> Result<Self, CoreError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let canonical = match kind {
            IdentifierType::Username => Self::validate_username(trimmed)?,
            IdentifierType::Email => Self::validate_email(trimmed)?,
            IdentifierType::Phone => Self::validate_phone(trimmed)?,
            IdentifierType::Ip => Self::validate_ip(trimmed)?,
        };
        Ok(Self {
            kind,
            value: canonical,
        })
    }

    /// The identifier type.
    #[must_use]
    pub fn kind(&self) -> IdentifierType {
        self.kind
    }

    /// The raw canonical value. Handle with care; never log this directly.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// A masked rendering safe for logs and audit records.
    #[must_use]
    pub fn masked(&self) -> String {
        match self.kind {
            IdentifierType::Email => match self.value.split_once('@') {
                Some((local, domain)) => {
                    let head = local.chars().next().map(String::from).unwrap_or_default();
                    format!("{head}***@{domain}")
                }
                None => "***".to_string(),
            },
            IdentifierType::Phone => {
                let len = self.value.chars().count();
                if len <= 2 {
                    "*".repeat(len)
                } else {
                    let tail: String = self
                        .value
                        .chars()
                        .skip(len - 2)
                        .collect();
                    format!("{}{tail}", "*".repeat(len - 2))
                }
            }
            IdentifierType::Username => {
                let head = self.value.chars().next().map(String::from).unwrap_or_default();
                format!("{head}***")
            }
            IdentifierType::Ip => match self.value.split_once('.') {
                Some((first_octet, _)) => format!("{first_octet}.*.*.*"),
                None => {
                    // IPv6: keep the leading group only
                    let head = self.value.split(':').next().unwrap_or("");
                    format!("{head}:***")
                }
            },
        }
    }

    fn validate_username(value: &str) -> Result<String, CoreError> {
        static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = USERNAME_REGEX.get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{1,63}$").expect("valid regex")
        });
        let value = value.strip_prefix('@').unwrap_or(value);
        if regex.is_match(value) {
            Ok(value.to_string())
        } else {
            Err(CoreError::Validation(
                "invalid username: must be 2-64 characters, alphanumeric with . _ -".to_string(),
            ))
        }
    }

    fn validate_email(value: &str) -> Result<String, CoreError> {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX
            .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid regex"));
        let lowered = value.to_lowercase();
        if regex.is_match(&lowered) {
            Ok(lowered)
        } else {
            Err(CoreError::Validation(
                "invalid email: expected local@domain.tld".to_string(),
            ))
        }
    }

    fn validate_phone(value: &str) -> Result<String, CoreError> {
        let canonical: String = value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        let digits = canonical.trim_start_matches('+');
        if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::Validation(
                "invalid phone: expected 7-15 digits, optionally prefixed with +".to_string(),
            ));
        }
        Ok(canonical)
    }

    fn validate_ip(value: &str) -> Result<String, CoreError> {
        value
            .parse::<IpAddr>()
            .map(|ip| ip.to_string())
            .map_err(|e| CoreError::Validation(format!("invalid IP address: {e}")))
    }
}

impl fmt::Display for Identifier {
    /// Masked on purpose: identifiers are PII and `Display` is what ends
    /// up in log lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Immediate, confirmed exposure (e.g. plaintext credentials on a leak site)
    Critical,
    /// Strong exposure signal tied directly to the identifier
    High,
    /// Meaningful but indirect signal
    Medium,
    /// Weak or circumstantial signal
    Low,
    /// Contextual information only
    Info,
}

impl Severity {
    /// Numeric rank, higher is more severe (info=0 .. critical=4).
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Info => 0,
        }
    }

    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Info => "Info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Terminal fetch status of one provider invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// The provider returned a payload
    Ok,
    /// The provider exceeded its per-invocation timeout
    Timeout,
    /// The provider failed (after any retry)
    Error,
    /// The provider was never invoked (unconfigured, unregistered, or cancelled)
    Skipped,
}

impl FetchStatus {
    /// Whether the invocation produced a usable payload.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ok => "ok",
            Self::Timeout => "timeout",
            Self::Error => "error",
            Self::Skipped => "skipped",
        };
        write!(f, "{label}")
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, CoreError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| CoreError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}
