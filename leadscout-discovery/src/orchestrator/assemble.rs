//! Packaging of ranked executives into the final [`DiscoveryResult`], and
//! the best-effort write-back to the store.

use std::time::Duration;

use crate::store::ExecutiveStore;
use crate::types::{DiscoveryResult, Executive, SourceKind, SourceOutcome};

use super::scoring;

/// Where a job's executives came from and how many candidates it saw.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    pub sources_used: Vec<SourceKind>,
    pub source_outcomes: Vec<SourceOutcome>,
    pub candidates_seen: usize,
    pub candidates_rejected: usize,
}

/// Identifies the company a job ran for.
#[derive(Debug, Clone, Copy)]
pub struct CompanyRef<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub domain: &'a str,
}

/// Build the final result for one job.
///
/// `ranked` must already be sorted and truncated. Every executive is stamped
/// with the job's processing time.
pub fn assemble(
    company: CompanyRef<'_>,
    ranked: Vec<Executive>,
    primary: Option<Executive>,
    provenance: Provenance,
    elapsed: Duration,
) -> DiscoveryResult {
    let processing_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    let stamp = |mut e: Executive| {
        e.processing_time_ms = processing_time_ms;
        e
    };
    let executives: Vec<Executive> = ranked.into_iter().map(stamp).collect();
    let primary_decision_maker = primary.map(stamp);
    let success_rate = scoring::success_rate(&executives);

    DiscoveryResult {
        company_id: company.id.to_owned(),
        company_name: company.name.to_owned(),
        company_domain: company.domain.to_owned(),
        executives,
        primary_decision_maker,
        sources_used: provenance.sources_used,
        source_outcomes: provenance.source_outcomes,
        candidates_seen: provenance.candidates_seen,
        candidates_rejected: provenance.candidates_rejected,
        processing_time_ms,
        success_rate,
    }
}

/// Upsert a result's executives. Failures are logged, never returned.
///
/// Returns whether the write succeeded.
pub async fn persist(store: &dyn ExecutiveStore, result: &DiscoveryResult) -> bool {
    match store
        .save_executives(&result.company_id, &result.executives)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "failed to persist executives");
            tracing::trace!(company_id = %result.company_id, "persistence failure company");
            false
        }
    }
}
