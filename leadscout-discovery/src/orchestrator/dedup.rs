//! Deduplication and merge of persons into unique executive identities.
//!
//! One pass over the persons: each is compared with every identity accepted
//! so far and either merged into the best match or accepted as a new
//! identity. Arrival order from the fan-out is non-deterministic, so the
//! persons are first put into a canonical order; the number of identities
//! and every merged field are then independent of input permutation.
//!
//! A merge can rename an identity (a synthesized surname yields to a
//! scraped one), so accepted identities are re-checked against each other
//! until no two of them match.

use std::cmp::Ordering;

use crate::types::{DiscoveryMethod, Executive, Person};

use super::similarity::NameSimilarity;

/// A title must be this much longer to replace the existing one.
const TITLE_LENGTH_FACTOR: f64 = 1.2;

/// Overall-confidence boost per corroborating source beyond the first.
const CORROBORATION_BOOST: f64 = 0.05;

/// Merge persons into unique executives.
///
/// Two persons are the same identity when their full names score at least
/// `threshold` on `similarity`, or their first and last names match
/// case-insensitively, and their email domains do not conflict. The output
/// is in canonical order; ranking happens later.
pub fn merge_all(
    persons: Vec<Person>,
    threshold: u8,
    similarity: &dyn NameSimilarity,
    method: DiscoveryMethod,
) -> Vec<Executive> {
    merge_persons(persons, threshold, similarity)
        .into_iter()
        .map(|person| into_executive(person, method))
        .collect()
}

/// Merge persons into unique identities, still as [`Person`] values.
pub fn merge_persons(
    mut persons: Vec<Person>,
    threshold: u8,
    similarity: &dyn NameSimilarity,
) -> Vec<Person> {
    persons.sort_by(canonical_cmp);

    let mut identities: Vec<Person> = Vec::with_capacity(persons.len());
    for person in persons {
        match best_match(&identities, &person, threshold, similarity) {
            Some(idx) => {
                let merged = merge_pair(&identities[idx], &person);
                identities[idx] = merged;
            }
            None => identities.push(person),
        }
    }

    identities.sort_by(canonical_cmp);
    while let Some((keep, absorb)) = first_matching_pair(&identities, threshold, similarity) {
        let absorbed = identities.remove(absorb);
        let merged = merge_pair(&identities[keep], &absorbed);
        identities[keep] = merged;
    }

    identities.sort_by(canonical_cmp);
    identities
}

/// The first `(i, j)` with `i < j` whose identities match.
fn first_matching_pair(
    identities: &[Person],
    threshold: u8,
    similarity: &dyn NameSimilarity,
) -> Option<(usize, usize)> {
    identities.iter().enumerate().find_map(|(i, a)| {
        identities[i + 1..]
            .iter()
            .position(|b| match_score(a, b, similarity).is_some_and(|s| s >= threshold))
            .map(|offset| (i, i + 1 + offset))
    })
}

/// Index of the accepted identity `person` should merge into, if any.
///
/// Picks the highest-scoring match; ties go to the earliest identity.
fn best_match(
    identities: &[Person],
    person: &Person,
    threshold: u8,
    similarity: &dyn NameSimilarity,
) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;
    for (idx, existing) in identities.iter().enumerate() {
        let Some(score) = match_score(existing, person, similarity) else {
            continue;
        };
        if score < threshold {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Name score of two persons, or `None` when their email domains conflict.
fn match_score(a: &Person, b: &Person, similarity: &dyn NameSimilarity) -> Option<u8> {
    if domains_conflict(a, b) {
        return None;
    }
    if same_first_and_last(a, b) {
        return Some(100);
    }
    Some(similarity.ratio(&a.full_name, &b.full_name))
}

fn same_first_and_last(a: &Person, b: &Person) -> bool {
    a.first_name.eq_ignore_ascii_case(&b.first_name)
        && a.last_name.eq_ignore_ascii_case(&b.last_name)
}

/// Both carry emails, at different domains.
fn domains_conflict(a: &Person, b: &Person) -> bool {
    match (a.email_domain(), b.email_domain()) {
        (Some(x), Some(y)) => !x.eq_ignore_ascii_case(y),
        _ => false,
    }
}

/// Combine two records of the same identity into a new one.
///
/// `existing` keeps its name unless its surname was synthesized and the
/// incoming one was scraped. Every other field follows its own preference
/// rule.
pub fn merge_pair(existing: &Person, incoming: &Person) -> Person {
    let title = if incoming.title.chars().count() as f64
        >= existing.title.chars().count() as f64 * TITLE_LENGTH_FACTOR
        && !incoming.title.is_empty()
    {
        incoming.title.clone()
    } else {
        existing.title.clone()
    };

    let (email, email_confidence) = prefer_field(
        (&existing.email, existing.email_confidence),
        (&incoming.email, incoming.email_confidence),
    );
    let (phone, phone_confidence) = prefer_field(
        (&existing.phone, existing.phone_confidence),
        (&incoming.phone, incoming.phone_confidence),
    );

    let take_incoming_profile = incoming.linkedin_url.is_some()
        && (existing.linkedin_url.is_none()
            || (incoming.linkedin_verified && !existing.linkedin_verified));
    let (linkedin_url, linkedin_verified) = if take_incoming_profile {
        (incoming.linkedin_url.clone(), incoming.linkedin_verified)
    } else {
        (existing.linkedin_url.clone(), existing.linkedin_verified)
    };

    // A synthesized surname yields to a scraped one.
    let name_source = if existing.synthesized_surname && !incoming.synthesized_surname {
        incoming
    } else {
        existing
    };

    Person {
        first_name: name_source.first_name.clone(),
        last_name: name_source.last_name.clone(),
        full_name: name_source.full_name.clone(),
        title,
        seniority_tier: existing.seniority_tier.most_senior(incoming.seniority_tier),
        email,
        email_confidence,
        phone,
        phone_confidence,
        linkedin_url,
        linkedin_verified,
        sources: existing.sources.union(&incoming.sources).copied().collect(),
        validation_confidence: existing
            .validation_confidence
            .max(incoming.validation_confidence),
        synthesized_surname: name_source.synthesized_surname,
    }
}

/// Prefer the value with the higher confidence; ties keep the existing one.
fn prefer_field(
    existing: (&Option<String>, f64),
    incoming: (&Option<String>, f64),
) -> (Option<String>, f64) {
    match (existing.0, incoming.0) {
        (None, Some(_)) => (incoming.0.clone(), incoming.1),
        (Some(_), Some(_)) if incoming.1 > existing.1 => (incoming.0.clone(), incoming.1),
        _ => (existing.0.clone(), existing.1),
    }
}

/// Wrap a merged person with scoring metadata.
pub fn into_executive(person: Person, method: DiscoveryMethod) -> Executive {
    let extra_sources = person.sources.len().saturating_sub(1) as f64;
    let overall_confidence =
        (person.validation_confidence + CORROBORATION_BOOST * extra_sources).clamp(0.0, 1.0);
    let data_completeness_score = data_completeness(&person);

    Executive {
        person,
        overall_confidence,
        data_completeness_score,
        discovery_method: method,
        processing_time_ms: 0,
    }
}

/// Fraction of email, phone, profile and title that are present.
pub fn data_completeness(person: &Person) -> f64 {
    let present = [
        person.email.is_some(),
        person.phone.is_some(),
        person.linkedin_url.is_some(),
        !person.title.is_empty(),
    ];
    present.iter().filter(|p| **p).count() as f64 / present.len() as f64
}

/// Total order over persons used to make merging order-independent.
fn canonical_cmp(a: &Person, b: &Person) -> Ordering {
    a.full_name
        .to_lowercase()
        .cmp(&b.full_name.to_lowercase())
        .then_with(|| a.full_name.cmp(&b.full_name))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| b.seniority_tier.rank().cmp(&a.seniority_tier.rank()))
        .then_with(|| a.email.cmp(&b.email))
        .then_with(|| a.phone.cmp(&b.phone))
        .then_with(|| a.linkedin_url.cmp(&b.linkedin_url))
        .then_with(|| a.sources.cmp(&b.sources))
        .then_with(|| b.validation_confidence.total_cmp(&a.validation_confidence))
        .then_with(|| b.email_confidence.total_cmp(&a.email_confidence))
        .then_with(|| b.phone_confidence.total_cmp(&a.phone_confidence))
        .then_with(|| b.linkedin_verified.cmp(&a.linkedin_verified))
        .then_with(|| a.synthesized_surname.cmp(&b.synthesized_surname))
        .then_with(|| a.first_name.cmp(&b.first_name))
        .then_with(|| a.last_name.cmp(&b.last_name))
}
