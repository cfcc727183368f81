//! Job-title classification into seniority tiers.
//!
//! Keyword sets are checked in order (tier 1, then 2, then 3) so that
//! "Managing Director" lands in tier 1 before "Director" can claim it.
//! Matching is on whole words after lowercasing and replacing punctuation
//! with spaces, so "Co-Founder" matches "founder" and "MD" does not match
//! inside "Mdina".

use crate::types::SeniorityTier;

const TIER_1_KEYWORDS: &[&str] = &[
    "ceo",
    "chief executive",
    "founder",
    "cofounder",
    "owner",
    "proprietor",
    "managing director",
    "md",
    "chairman",
    "chairwoman",
    "chairperson",
    "president",
    "managing partner",
    "principal",
];

const TIER_2_KEYWORDS: &[&str] = &[
    "director",
    "manager",
    "head of",
    "head",
    "chief",
    "cfo",
    "coo",
    "cto",
    "cmo",
    "cio",
    "vice president",
    "vp",
    "partner",
];

const TIER_3_KEYWORDS: &[&str] = &[
    "supervisor",
    "team leader",
    "lead",
    "coordinator",
    "officer",
    "executive",
    "senior",
    "administrator",
    "controller",
    "secretary",
    "treasurer",
    "associate",
];

/// Classify a job title into a [`SeniorityTier`].
///
/// Titles with no executive-like keyword are [`SeniorityTier::Unknown`].
pub fn classify_title(title: &str) -> SeniorityTier {
    let forms = word_forms(title);
    if forms.is_empty() {
        return SeniorityTier::Unknown;
    }

    let tiers = [
        (TIER_1_KEYWORDS, SeniorityTier::Tier1),
        (TIER_2_KEYWORDS, SeniorityTier::Tier2),
        (TIER_3_KEYWORDS, SeniorityTier::Tier3),
    ];
    tiers
        .iter()
        .find(|(keywords, _)| {
            keywords.iter().any(|k| {
                let needle = format!(" {k} ");
                forms.iter().any(|form| form.contains(&needle))
            })
        })
        .map_or(SeniorityTier::Unknown, |(_, tier)| *tier)
}

/// Space-padded word forms of a title: one with hyphens split into
/// separate words, one with hyphenated words joined ("co-founder" →
/// "cofounder"). Empty when the title has no words.
fn word_forms(title: &str) -> Vec<String> {
    let lowered = title.to_lowercase();
    let split = words_of(lowered.chars());
    if split.is_empty() {
        return Vec::new();
    }
    let joined = words_of(lowered.chars().filter(|c| *c != '-'));
    vec![format!(" {split} "), format!(" {joined} ")]
}

fn words_of(chars: impl Iterator<Item = char>) -> String {
    let mapped: String = chars
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}
