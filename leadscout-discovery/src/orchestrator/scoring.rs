//! Confidence filtering, priority ranking and primary selection.
//!
//! Formula:
//!
//! ```text
//! priority = seniority_factor * seniority_weight(tier)
//!          + completeness bonuses (email, phone, linkedin, verified)
//!          + confidence_factor * overall_confidence
//! ```
//!
//! All constants come from [`RankingWeights`].

use crate::config::RankingWeights;
use crate::types::{Executive, SeniorityTier};

/// Calculate the ranking priority of an executive.
pub fn priority_score(executive: &Executive, weights: &RankingWeights) -> f64 {
    let person = &executive.person;
    let mut completeness = 0.0;
    if person.email.is_some() {
        completeness += weights.email_bonus;
    }
    if person.phone.is_some() {
        completeness += weights.phone_bonus;
    }
    if person.linkedin_url.is_some() {
        completeness += weights.linkedin_bonus;
    }
    if person.linkedin_verified {
        completeness += weights.verified_bonus;
    }

    weights.seniority_factor * weights.seniority_weight(person.seniority_tier)
        + completeness
        + weights.confidence_factor * executive.overall_confidence
}

/// Drop executives whose overall confidence is below `threshold`.
pub fn apply_confidence_threshold(executives: Vec<Executive>, threshold: f64) -> Vec<Executive> {
    executives
        .into_iter()
        .filter(|e| e.overall_confidence >= threshold)
        .collect()
}

/// Sort executives by descending priority and truncate to `limit`.
///
/// Equal priorities are ordered by full name so the ranking is stable
/// across runs.
pub fn rank(
    mut executives: Vec<Executive>,
    weights: &RankingWeights,
    limit: usize,
) -> Vec<Executive> {
    executives.sort_by(|a, b| {
        priority_score(b, weights)
            .total_cmp(&priority_score(a, weights))
            .then_with(|| a.full_name().cmp(b.full_name()))
    });
    executives.truncate(limit);
    executives
}

/// Pick the primary decision maker from an already ranked list.
///
/// First tier-1 executive, else first tier-2, else the top of the list.
pub fn select_primary(ranked: &[Executive]) -> Option<Executive> {
    ranked
        .iter()
        .find(|e| e.tier() == SeniorityTier::Tier1)
        .or_else(|| ranked.iter().find(|e| e.tier() == SeniorityTier::Tier2))
        .or_else(|| ranked.first())
        .cloned()
}

/// Job-level success rate in `[0, 1]`.
///
/// Zero with no executives; otherwise a base of 0.25, plus 0.25 when any
/// tier-1 executive was found, plus capped bonuses for emails and profiles.
pub fn success_rate(executives: &[Executive]) -> f64 {
    if executives.is_empty() {
        return 0.0;
    }

    let has_tier_1 = executives.iter().any(|e| e.tier() == SeniorityTier::Tier1);
    let emails = executives.iter().filter(|e| e.person.email.is_some()).count() as f64;
    let profiles = executives
        .iter()
        .filter(|e| e.person.linkedin_url.is_some())
        .count() as f64;

    let mut rate = 0.25;
    if has_tier_1 {
        rate += 0.25;
    }
    rate += (0.15 * emails).min(0.30);
    rate += (0.10 * profiles).min(0.20);
    rate.min(1.0)
}
