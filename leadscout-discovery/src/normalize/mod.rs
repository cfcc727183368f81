//! Candidate normalizer: turns an untrusted [`RawCandidate`] into a
//! validated [`Person`], or rejects it.
//!
//! Rejections are silent. They are logged at debug level and counted, but
//! never reported as errors.
//!
//! # Confidence
//!
//! ```text
//! confidence = 0.30 * pattern          (two words 1.0, one word 0.5)
//!            + 0.25 * known_first_name (1.0 or 0.0)
//!            + 0.20 * structure        (1.0, or 0.6 when re-capitalised)
//!            + 0.25 * extraction_confidence
//!            + 0.10 per context signal type (max +0.20)
//!            - 0.15 per business-term collision
//! ```
//!
//! Clamped to `[0, 1]`. One-word names promoted with a synthesized surname
//! are then scaled by 0.7 and capped at 0.55.

pub mod contact;
pub mod names;
pub mod seniority;

use std::collections::BTreeSet;

use crate::types::{Person, RawCandidate, SourceKind};

use contact::{clean_email, clean_phone, normalize_profile_url};
use names::{clean_name, is_known_first_name, is_person_name, synthesize_surname};
use seniority::classify_title;

const PATTERN_WEIGHT: f64 = 0.30;
const KNOWN_NAME_WEIGHT: f64 = 0.25;
const STRUCTURE_WEIGHT: f64 = 0.20;
const EXTRACTION_WEIGHT: f64 = 0.25;
const CONTEXT_BONUS: f64 = 0.10;
const MAX_CONTEXT_BONUS: f64 = 0.20;
const COLLISION_PENALTY: f64 = 0.15;
const SINGLE_NAME_FACTOR: f64 = 0.7;
const SINGLE_NAME_CAP: f64 = 0.55;
const RECASED_STRUCTURE: f64 = 0.6;
/// Added to an email's confidence when it sits on the company domain.
const COMPANY_EMAIL_BONUS: f64 = 0.1;

/// Company context a candidate is validated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeContext {
    pub company_name: String,
    /// Lower-cased domain, e.g. `jacktheplumber.co.uk`.
    pub company_domain: String,
    /// Declared trade, e.g. `plumbing`.
    pub trade: Option<String>,
}

impl NormalizeContext {
    pub fn new(company_name: impl Into<String>, company_domain: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            company_domain: company_domain.into(),
            trade: None,
        }
    }

    pub fn with_trade(mut self, trade: impl Into<String>) -> Self {
        self.trade = Some(trade.into());
        self
    }
}

/// Phrases in the surrounding text that vouch for a real person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContextSignal {
    /// "founded by", "established by".
    Founder,
    /// "I am", "my name is".
    SelfIntroduction,
    /// "call Jack on", "speak to Jack".
    DirectContact,
    /// "owned by", "run by".
    Ownership,
}

const FOUNDER_PHRASES: &[&str] = &["founded by", "established by", "set up by", "started by"];
const SELF_INTRO_PHRASES: &[&str] = &["i am ", "i'm ", "my name is", "hi, i'm", "hello, i'm"];
const DIRECT_CONTACT_VERBS: &[&str] = &["call", "speak to", "ask for", "contact", "email", "ring"];
const OWNERSHIP_PHRASES: &[&str] = &["owned by", "run by", "managed by", "owner"];

/// Detect context signals in a snippet, keyed on the candidate's first name
/// for the direct-contact check.
pub fn context_signals(snippet: &str, first_name: &str) -> BTreeSet<ContextSignal> {
    let text = snippet.to_lowercase();
    let first = first_name.to_lowercase();
    let mut signals = BTreeSet::new();

    if FOUNDER_PHRASES.iter().any(|p| text.contains(p)) {
        signals.insert(ContextSignal::Founder);
    }
    if SELF_INTRO_PHRASES.iter().any(|p| text.contains(p)) {
        signals.insert(ContextSignal::SelfIntroduction);
    }
    if !first.is_empty()
        && DIRECT_CONTACT_VERBS
            .iter()
            .any(|verb| text.contains(&format!("{verb} {first}")))
    {
        signals.insert(ContextSignal::DirectContact);
    }
    if OWNERSHIP_PHRASES.iter().any(|p| text.contains(p)) {
        signals.insert(ContextSignal::Ownership);
    }
    signals
}

/// Validate and clean one candidate.
///
/// Returns `None` when the name does not look like a person, or when a
/// one-word name cannot be given a contextual surname.
pub fn normalize(raw: &RawCandidate, ctx: &NormalizeContext) -> Option<Person> {
    let cleaned = clean_name(&raw.raw_name);
    if !is_person_name(&cleaned.words) {
        tracing::debug!(source = %raw.source, "candidate rejected: not a person name");
        return None;
    }

    let first_name = cleaned.words[0].clone();
    let (last_name, synthesized_surname) = match cleaned.words.get(1) {
        Some(last) => (last.clone(), false),
        None => {
            let surname = synthesize_surname(
                &first_name,
                &ctx.company_name,
                &ctx.company_domain,
                ctx.trade.as_deref(),
            );
            let Some(surname) = surname else {
                tracing::debug!(source = %raw.source, "candidate rejected: no surname context");
                return None;
            };
            (surname, true)
        }
    };

    let signals = context_signals(&raw.context_snippet, &first_name);
    let pattern = if synthesized_surname { 0.5 } else { 1.0 };
    let known = if is_known_first_name(&first_name) { 1.0 } else { 0.0 };
    let structure = if cleaned.recased { RECASED_STRUCTURE } else { 1.0 };
    let extraction = raw.extraction_confidence.clamp(0.0, 1.0);
    let context = (signals.len() as f64 * CONTEXT_BONUS).min(MAX_CONTEXT_BONUS);

    let mut confidence = (PATTERN_WEIGHT * pattern
        + KNOWN_NAME_WEIGHT * known
        + STRUCTURE_WEIGHT * structure
        + EXTRACTION_WEIGHT * extraction
        + context
        - COLLISION_PENALTY * cleaned.collisions as f64)
        .clamp(0.0, 1.0);
    if synthesized_surname {
        confidence = (confidence * SINGLE_NAME_FACTOR).min(SINGLE_NAME_CAP);
    }

    let email = raw.email.as_deref().and_then(clean_email);
    let email_confidence = email.as_deref().map_or(0.0, |e| {
        let on_company_domain = !ctx.company_domain.is_empty()
            && e.ends_with(&format!("@{}", ctx.company_domain));
        let bonus = if on_company_domain { COMPANY_EMAIL_BONUS } else { 0.0 };
        (extraction + bonus).min(1.0)
    });
    let phone = raw.phone.as_deref().and_then(clean_phone);
    let phone_confidence = if phone.is_some() { extraction } else { 0.0 };
    let linkedin_url = raw.linkedin_url.as_deref().and_then(normalize_profile_url);
    let linkedin_verified =
        linkedin_url.is_some() && raw.source == SourceKind::ProfessionalNetwork;

    Some(Person {
        full_name: format!("{first_name} {last_name}"),
        first_name,
        last_name,
        title: raw.title.trim().to_string(),
        seniority_tier: classify_title(&raw.title),
        email,
        email_confidence,
        phone,
        phone_confidence,
        linkedin_url,
        linkedin_verified,
        sources: BTreeSet::from([raw.source]),
        validation_confidence: confidence,
        synthesized_surname,
    })
}

/// Normalize a batch, returning accepted persons and the rejection count.
pub fn normalize_all(raws: &[RawCandidate], ctx: &NormalizeContext) -> (Vec<Person>, usize) {
    let persons: Vec<Person> = raws.iter().filter_map(|raw| normalize(raw, ctx)).collect();
    let rejected = raws.len() - persons.len();
    (persons, rejected)
}
