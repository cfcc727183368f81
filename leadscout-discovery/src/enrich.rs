//! Optional post-merge contact enrichment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;
use crate::types::Executive;

/// An email address found by an enricher, with its own confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEmail {
    pub email: String,
    pub confidence: f64,
}

/// Looks up a contact email for an executive who has none.
#[async_trait]
pub trait EmailEnricher: Send + Sync {
    /// Return an email for `executive` at `company_domain`, if one is found.
    async fn enrich_email(
        &self,
        executive: &Executive,
        company_domain: &str,
    ) -> Result<Option<EnrichedEmail>, DiscoveryError>;
}

/// Apply an enrichment result to an executive.
///
/// The address goes through the same cleaning as scraped emails. An
/// existing email is only replaced by a strictly more confident one.
/// Returns whether the executive changed.
pub fn apply_enriched_email(executive: &mut Executive, enriched: EnrichedEmail) -> bool {
    let Some(email) = crate::normalize::contact::clean_email(&enriched.email) else {
        return false;
    };
    let confidence = enriched.confidence.clamp(0.0, 1.0);
    let person = &mut executive.person;
    if person.email.is_some() && confidence <= person.email_confidence {
        return false;
    }
    person.email = Some(email);
    person.email_confidence = confidence;
    true
}
