//! Core types for executive discovery: one explicit type per pipeline stage.
//!
//! ```text
//! RawCandidate ─normalize─► Person ─merge─► Executive ─rank─► DiscoveryResult
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An independent discovery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The company's own website (about/team/contact pages).
    Website,
    /// Professional-network profiles (LinkedIn and similar).
    ProfessionalNetwork,
    /// Business-directory listings (Yell, Checkatrade, Companies House, ...).
    Directory,
}

impl SourceKind {
    /// Returns the stable identifier of this source.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::ProfessionalNetwork => "professional_network",
            Self::Directory => "directory",
        }
    }

    /// Returns all source variants.
    pub fn all() -> &'static [SourceKind] {
        &[Self::Website, Self::ProfessionalNetwork, Self::Directory]
    }

    /// Default per-source timeout in milliseconds.
    pub fn default_timeout_ms(&self) -> u64 {
        match self {
            Self::Website => 20_000,
            Self::ProfessionalNetwork => 25_000,
            Self::Directory => 20_000,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse seniority rank inferred from a job title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeniorityTier {
    /// CEO, founder, owner, managing director.
    #[serde(rename = "tier_1")]
    Tier1,
    /// Director, manager, head of.
    #[serde(rename = "tier_2")]
    Tier2,
    /// Other executive-like titles.
    #[serde(rename = "tier_3")]
    Tier3,
    /// Title carried no seniority signal.
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl SeniorityTier {
    /// Numeric seniority: higher is more senior.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Tier1 => 3,
            Self::Tier2 => 2,
            Self::Tier3 => 1,
            Self::Unknown => 0,
        }
    }

    /// Returns whichever of the two tiers is more senior.
    pub fn most_senior(self, other: SeniorityTier) -> SeniorityTier {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    /// Returns the stable identifier of this tier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tier1 => "tier_1",
            Self::Tier2 => "tier_2",
            Self::Tier3 => "tier_3",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SeniorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unvalidated executive-like record emitted by one source adapter.
///
/// Untrusted: every field may be noisy, empty, or plainly wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Which source produced this record.
    pub source: SourceKind,
    /// Name as scraped, possibly with honorifics or business suffixes.
    pub raw_name: String,
    /// Job title as scraped. May be empty.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    /// Surrounding text the name was found in.
    #[serde(default)]
    pub context_snippet: String,
    /// The adapter's own confidence in this extraction, in `[0, 1]`.
    #[serde(default = "default_extraction_confidence")]
    pub extraction_confidence: f64,
}

fn default_extraction_confidence() -> f64 {
    0.5
}

impl RawCandidate {
    /// Create a candidate with only a name; other fields empty.
    pub fn new(source: SourceKind, raw_name: impl Into<String>) -> Self {
        Self {
            source,
            raw_name: raw_name.into(),
            title: String::new(),
            email: None,
            phone: None,
            linkedin_url: None,
            context_snippet: String::new(),
            extraction_confidence: default_extraction_confidence(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_linkedin(mut self, url: impl Into<String>) -> Self {
        self.linkedin_url = Some(url.into());
        self
    }

    pub fn with_context(mut self, snippet: impl Into<String>) -> Self {
        self.context_snippet = snippet.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.extraction_confidence = confidence;
        self
    }
}

/// A candidate that passed name validation.
///
/// Never mutated in place once built; merging produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub title: String,
    pub seniority_tier: SeniorityTier,
    pub email: Option<String>,
    /// Confidence in `email`; 0.0 when absent.
    pub email_confidence: f64,
    pub phone: Option<String>,
    /// Confidence in `phone`; 0.0 when absent.
    pub phone_confidence: f64,
    pub linkedin_url: Option<String>,
    /// The profile link came from the professional-network source itself.
    pub linkedin_verified: bool,
    /// Every source that reported this identity.
    pub sources: BTreeSet<SourceKind>,
    /// Name/title validation confidence in `[0, 1]`.
    pub validation_confidence: f64,
    /// The last name was inferred from company context, not scraped.
    pub synthesized_surname: bool,
}

impl Person {
    /// Domain part of the email address, lower-cased, if any.
    pub fn email_domain(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|e| e.rsplit_once('@'))
            .map(|(_, domain)| domain)
    }
}

/// How the candidates behind a result were gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    /// A fused adapter that combines sources internally.
    Fused,
    /// All per-source adapters launched together.
    Parallel,
    /// Per-source adapters invoked one at a time.
    Sequential,
}

impl DiscoveryMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fused => "fused",
            Self::Parallel => "parallel",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A deduplicated, merged identity with scoring metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executive {
    #[serde(flatten)]
    pub person: Person,
    /// Validation confidence plus cross-source corroboration, in `[0, 1]`.
    pub overall_confidence: f64,
    /// Fraction of contact fields present, in `[0, 1]`.
    pub data_completeness_score: f64,
    pub discovery_method: DiscoveryMethod,
    pub processing_time_ms: u64,
}

impl Executive {
    pub fn full_name(&self) -> &str {
        &self.person.full_name
    }

    pub fn tier(&self) -> SeniorityTier {
        self.person.seniority_tier
    }
}

/// What happened to one source during a fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    /// Completed without error.
    Succeeded { candidates: usize },
    /// The adapter returned an error or panicked.
    Failed { reason: String },
    /// The per-source timeout fired.
    TimedOut,
    /// The circuit breaker kept this source from being called.
    Skipped,
    /// The global budget expired or the caller cancelled first.
    Cancelled,
}

impl SourceStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Provenance for one source in one discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub source: SourceKind,
    #[serde(flatten)]
    pub status: SourceStatus,
    pub elapsed_ms: u64,
}

/// The final, immutable output of one discovery job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub company_id: String,
    pub company_name: String,
    pub company_domain: String,
    /// Ranked best-first, at most `max_executives_per_company` long.
    pub executives: Vec<Executive>,
    pub primary_decision_maker: Option<Executive>,
    /// Sources that completed without error.
    pub sources_used: Vec<SourceKind>,
    pub source_outcomes: Vec<SourceOutcome>,
    pub candidates_seen: usize,
    pub candidates_rejected: usize,
    pub processing_time_ms: u64,
    pub success_rate: f64,
}

/// Parameters for one discovery job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryJob {
    pub company_id: String,
    pub company_name: String,
    pub website_url: String,
    /// Declared trade (e.g. `plumbing`), used to complete one-word names.
    #[serde(default)]
    pub trade: Option<String>,
}

impl DiscoveryJob {
    pub fn new(
        company_id: impl Into<String>,
        company_name: impl Into<String>,
        website_url: impl Into<String>,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            company_name: company_name.into(),
            website_url: website_url.into(),
            trade: None,
        }
    }

    pub fn with_trade(mut self, trade: impl Into<String>) -> Self {
        self.trade = Some(trade.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str) -> Person {
        let (first, last) = name.split_once(' ').unwrap_or((name, ""));
        Person {
            first_name: first.into(),
            last_name: last.into(),
            full_name: name.into(),
            title: "Director".into(),
            seniority_tier: SeniorityTier::Tier2,
            email: Some("jane@acme.co.uk".into()),
            email_confidence: 0.8,
            phone: None,
            phone_confidence: 0.0,
            linkedin_url: None,
            linkedin_verified: false,
            sources: BTreeSet::from([SourceKind::Website]),
            validation_confidence: 0.9,
            synthesized_surname: false,
        }
    }

    #[test]
    fn source_kind_display() {
        assert_eq!(SourceKind::Website.to_string(), "website");
        assert_eq!(
            SourceKind::ProfessionalNetwork.to_string(),
            "professional_network"
        );
        assert_eq!(SourceKind::Directory.to_string(), "directory");
    }

    #[test]
    fn source_kind_default_timeouts() {
        assert_eq!(SourceKind::Website.default_timeout_ms(), 20_000);
        assert_eq!(SourceKind::ProfessionalNetwork.default_timeout_ms(), 25_000);
    }

    #[test]
    fn source_kind_serde_uses_snake_case() {
        let json = serde_json::to_string(&SourceKind::ProfessionalNetwork).expect("serialize");
        assert_eq!(json, "\"professional_network\"");
        let decoded: SourceKind = serde_json::from_str("\"directory\"").expect("deserialize");
        assert_eq!(decoded, SourceKind::Directory);
    }

    #[test]
    fn tier_ordering_prefers_most_senior() {
        assert_eq!(
            SeniorityTier::Tier2.most_senior(SeniorityTier::Tier1),
            SeniorityTier::Tier1
        );
        assert_eq!(
            SeniorityTier::Tier1.most_senior(SeniorityTier::Tier3),
            SeniorityTier::Tier1
        );
        assert_eq!(
            SeniorityTier::Unknown.most_senior(SeniorityTier::Tier3),
            SeniorityTier::Tier3
        );
    }

    #[test]
    fn tier_serde_names() {
        let json = serde_json::to_string(&SeniorityTier::Tier1).expect("serialize");
        assert_eq!(json, "\"tier_1\"");
        let decoded: SeniorityTier = serde_json::from_str("\"unknown\"").expect("deserialize");
        assert_eq!(decoded, SeniorityTier::Unknown);
    }

    #[test]
    fn raw_candidate_defaults_when_deserialised_sparse() {
        let raw: RawCandidate =
            serde_json::from_str(r#"{"source":"website","raw_name":"Jane Doe"}"#)
                .expect("deserialize");
        assert_eq!(raw.raw_name, "Jane Doe");
        assert!(raw.title.is_empty());
        assert!(raw.email.is_none());
        assert!((raw.extraction_confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn raw_candidate_builder() {
        let raw = RawCandidate::new(SourceKind::Directory, "Jack Plumber")
            .with_title("Business Contact")
            .with_phone("01234 567890")
            .with_confidence(0.7);
        assert_eq!(raw.title, "Business Contact");
        assert_eq!(raw.phone.as_deref(), Some("01234 567890"));
        assert!((raw.extraction_confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn person_email_domain() {
        let p = person("Jane Doe");
        assert_eq!(p.email_domain(), Some("acme.co.uk"));
    }

    #[test]
    fn executive_flattens_person_fields() {
        let exec = Executive {
            person: person("Jane Doe"),
            overall_confidence: 0.9,
            data_completeness_score: 0.5,
            discovery_method: DiscoveryMethod::Parallel,
            processing_time_ms: 12,
        };
        let json = serde_json::to_value(&exec).expect("serialize");
        assert_eq!(json["full_name"], "Jane Doe");
        assert_eq!(json["seniority_tier"], "tier_2");
        assert_eq!(json["discovery_method"], "parallel");
    }

    #[test]
    fn source_status_tagged_serialisation() {
        let outcome = SourceOutcome {
            source: SourceKind::Website,
            status: SourceStatus::Succeeded { candidates: 3 },
            elapsed_ms: 40,
        };
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["candidates"], 3);
        assert!(outcome.status.is_success());
        assert!(!SourceStatus::TimedOut.is_success());
    }
}
