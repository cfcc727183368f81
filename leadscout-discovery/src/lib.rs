//! # leadscout-discovery
//!
//! Multi-source executive contact resolution for Leadscout.
//!
//! Given a company name and website, this crate queries several independent,
//! unreliable discovery sources concurrently, cleans their noisy candidates
//! into validated people, merges duplicates across sources into unique
//! executives, and ranks them to pick a primary decision maker. It does so
//! within a bounded time budget; no single source can sink a job.
//!
//! ## Design
//!
//! - Sources plug in through [`ContactSource`]; scraping lives outside this crate
//! - Parallel or sequential fan-out with per-source and global timeouts
//! - Panics and errors in one source never affect its siblings
//! - Order-independent fuzzy merge with a swappable [`NameSimilarity`]
//! - Per-engine circuit breaker and result cache, no process-wide state
//! - Best-effort write-back through [`ExecutiveStore`]
//!
//! ## Privacy
//!
//! - Company identifiers are logged only at trace level
//! - Executive names and contact details are never logged

pub mod batch;
pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod rate_limit;
pub mod source;
pub mod store;
pub mod types;

pub use batch::{BatchOutcome, BatchRunner, JobOutcome};
pub use config::{DiscoveryConfig, RankingWeights};
pub use engine::{DiscoveryEngine, DiscoveryEngineBuilder};
pub use enrich::{EmailEnricher, EnrichedEmail};
pub use error::{DiscoveryError, Result};
pub use orchestrator::similarity::{LevenshteinRatio, NameSimilarity};
pub use rate_limit::{RateLimitError, RateLimiter};
pub use source::{ContactSource, FusedSource};
pub use store::{ExecutiveStore, InMemoryExecutiveStore};
pub use types::{
    DiscoveryJob, DiscoveryMethod, DiscoveryResult, Executive, Person, RawCandidate,
    SeniorityTier, SourceKind, SourceOutcome, SourceStatus,
};

/// Discover executives for one company with a fresh engine.
///
/// Convenience wrapper for one-off jobs: builds an engine from `sources`
/// with default collaborators and runs a single job without cancellation.
///
/// # Errors
///
/// Returns [`DiscoveryError::Config`] if `config` is invalid.
///
/// # Examples
///
/// ```no_run
/// # async fn example(
/// #     sources: Vec<std::sync::Arc<dyn leadscout_discovery::ContactSource>>,
/// # ) -> leadscout_discovery::Result<()> {
/// let config = leadscout_discovery::DiscoveryConfig::default();
/// let result = leadscout_discovery::discover_executives(
///     sources,
///     "c-1",
///     "Jack The Plumber",
///     "https://jacktheplumber.co.uk",
///     &config,
/// )
/// .await?;
/// if let Some(primary) = &result.primary_decision_maker {
///     println!("{} ({})", primary.full_name(), primary.person.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn discover_executives(
    sources: Vec<std::sync::Arc<dyn ContactSource>>,
    company_id: &str,
    company_name: &str,
    website_url: &str,
    config: &DiscoveryConfig,
) -> Result<DiscoveryResult> {
    let engine = sources
        .into_iter()
        .fold(DiscoveryEngine::builder(), DiscoveryEngineBuilder::source)
        .build();
    engine
        .discover_executives(
            company_id,
            company_name,
            website_url,
            config,
            &tokio_util::sync::CancellationToken::new(),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn discover_validates_config() {
        let config = DiscoveryConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        let result = discover_executives(Vec::new(), "c-1", "Acme", "https://acme.co.uk", &config).await;
        let err = result.expect_err("invalid threshold");
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[tokio::test]
    async fn no_sources_yields_empty_result() {
        let result = discover_executives(
            Vec::new(),
            "c-1",
            "Acme",
            "https://acme.co.uk",
            &DiscoveryConfig::default(),
        )
        .await
        .expect("empty discovery");
        assert!(result.executives.is_empty());
        assert!(result.primary_decision_maker.is_none());
        assert!(result.sources_used.is_empty());
        assert_eq!(result.success_rate, 0.0);
    }
}
