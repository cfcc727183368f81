//! The discovery job entry point.
//!
//! A [`DiscoveryEngine`] owns everything that outlives a single job: the
//! registered sources, source health, the result cache and the store. Jobs
//! themselves share no mutable state.

use std::sync::Arc;

use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheKey, ResultCache};
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::config::DiscoveryConfig;
use crate::enrich::{apply_enriched_email, EmailEnricher};
use crate::error::Result;
use crate::normalize::contact::company_domain;
use crate::normalize::{normalize_all, NormalizeContext};
use crate::orchestrator::assemble::{assemble, persist, CompanyRef, Provenance};
use crate::orchestrator::dedup::{data_completeness, merge_all};
use crate::orchestrator::fanout::SourceOrchestrator;
use crate::orchestrator::scoring::{apply_confidence_threshold, rank, select_primary};
use crate::orchestrator::similarity::{LevenshteinRatio, NameSimilarity};
use crate::source::{ContactSource, FusedSource};
use crate::store::{ExecutiveStore, InMemoryExecutiveStore};
use crate::types::{DiscoveryJob, DiscoveryResult, Executive, SourceKind};

/// Resolves executives for companies from a fixed set of sources.
pub struct DiscoveryEngine {
    orchestrator: SourceOrchestrator,
    store: Arc<dyn ExecutiveStore>,
    enricher: Option<Arc<dyn EmailEnricher>>,
    similarity: Arc<dyn NameSimilarity>,
    cache: ResultCache,
}

impl std::fmt::Debug for DiscoveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryEngine")
            .field("orchestrator", &self.orchestrator)
            .field("enricher", &self.enricher.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}

impl DiscoveryEngine {
    pub fn builder() -> DiscoveryEngineBuilder {
        DiscoveryEngineBuilder::default()
    }

    /// Discover, merge and rank the executives of one company.
    ///
    /// The only error is [`DiscoveryError::Config`](crate::DiscoveryError::Config),
    /// returned before any source is called. Source failures, timeouts,
    /// enrichment and persistence failures all degrade to a partial (possibly
    /// empty) result.
    pub async fn discover_executives(
        &self,
        company_id: &str,
        company_name: &str,
        website_url: &str,
        config: &DiscoveryConfig,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult> {
        let job = DiscoveryJob::new(company_id, company_name, website_url);
        self.discover_job(&job, config, cancel).await
    }

    /// Like [`discover_executives`](Self::discover_executives), taking a
    /// [`DiscoveryJob`] that may declare the company's trade.
    pub async fn discover_job(
        &self,
        job: &DiscoveryJob,
        config: &DiscoveryConfig,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult> {
        config.validate()?;

        let started = Instant::now();
        let domain = company_domain(&job.website_url);
        tracing::trace!(
            company_id = %job.company_id,
            company = %job.company_name,
            domain = %domain,
            "starting discovery"
        );

        let use_cache = config.cache_ttl_seconds > 0 && self.cache.is_enabled();
        let cache_key = CacheKey::new(&job.company_name, &domain, &config.enabled_sources);
        if use_cache {
            if let Some(mut cached) = self.cache.get(&cache_key).await {
                tracing::debug!(
                    executives = cached.executives.len(),
                    "discovery result served from cache"
                );
                cached.company_id.clone_from(&job.company_id);
                persist(self.store.as_ref(), &cached).await;
                return Ok(cached);
            }
        }

        let fan = self
            .orchestrator
            .run(&job.company_name, &job.website_url, config, cancel)
            .await;
        let sources_used = fan.sources_used();

        let mut ctx = NormalizeContext::new(job.company_name.as_str(), domain.as_str());
        if let Some(trade) = &job.trade {
            ctx = ctx.with_trade(trade.as_str());
        }
        let (persons, rejected) = normalize_all(&fan.candidates, &ctx);
        tracing::debug!(
            candidates = fan.candidates.len(),
            persons = persons.len(),
            rejected,
            "normalised candidates"
        );

        let mut executives = merge_all(
            persons,
            config.similarity_threshold(),
            self.similarity.as_ref(),
            fan.method,
        );

        let deadline = started + config.global_timeout();
        if let Some(enricher) = &self.enricher {
            self.enrich(enricher.as_ref(), &mut executives, &domain, deadline, cancel)
                .await;
        }

        let kept = apply_confidence_threshold(executives, config.confidence_threshold);
        let ranked = rank(kept, &config.ranking, config.max_executives_per_company);
        let primary = select_primary(&ranked);

        let result = assemble(
            CompanyRef {
                id: &job.company_id,
                name: &job.company_name,
                domain: &domain,
            },
            ranked,
            primary,
            Provenance {
                sources_used,
                source_outcomes: fan.outcomes,
                candidates_seen: fan.candidates.len(),
                candidates_rejected: rejected,
            },
            started.elapsed(),
        );

        persist(self.store.as_ref(), &result).await;

        tracing::info!(
            executives = result.executives.len(),
            sources = result.sources_used.len(),
            method = fan.method.name(),
            success_rate = result.success_rate,
            elapsed_ms = result.processing_time_ms,
            "discovery complete"
        );

        if use_cache {
            self.cache.insert(cache_key, result.clone()).await;
        }
        Ok(result)
    }

    /// Fill missing emails, bounded by what remains of the job budget.
    async fn enrich(
        &self,
        enricher: &dyn EmailEnricher,
        executives: &mut [Executive],
        domain: &str,
        deadline: Instant,
        cancel: &CancellationToken,
    ) {
        for executive in executives.iter_mut().filter(|e| e.person.email.is_none()) {
            if cancel.is_cancelled() || Instant::now() >= deadline {
                tracing::debug!("no budget left for enrichment");
                return;
            }
            let lookup = tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                r = timeout_at(deadline, enricher.enrich_email(executive, domain)) => r,
            };
            match lookup {
                Ok(Ok(Some(found))) => {
                    if apply_enriched_email(executive, found) {
                        executive.data_completeness_score = data_completeness(&executive.person);
                    }
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "email enrichment failed"),
                Err(_) => {
                    tracing::warn!("email enrichment ran out of budget");
                    return;
                }
            }
        }
    }

    /// Current circuit state of every source seen so far.
    pub fn source_health(&self) -> Vec<(SourceKind, CircuitState, u32)> {
        self.orchestrator.breaker().health_report()
    }
}

/// Builder for [`DiscoveryEngine`].
#[derive(Default)]
pub struct DiscoveryEngineBuilder {
    sources: Vec<Arc<dyn ContactSource>>,
    fused: Option<Arc<dyn FusedSource>>,
    store: Option<Arc<dyn ExecutiveStore>>,
    enricher: Option<Arc<dyn EmailEnricher>>,
    similarity: Option<Arc<dyn NameSimilarity>>,
    breaker: Option<CircuitBreakerConfig>,
    cache_ttl_seconds: u64,
}

impl DiscoveryEngineBuilder {
    /// Register a per-source adapter.
    pub fn source(mut self, source: Arc<dyn ContactSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Register the fused adapter tried before the per-source path.
    pub fn fused(mut self, fused: Arc<dyn FusedSource>) -> Self {
        self.fused = Some(fused);
        self
    }

    /// Where results are written back. Defaults to an in-memory store.
    pub fn store(mut self, store: Arc<dyn ExecutiveStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn enricher(mut self, enricher: Arc<dyn EmailEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Name similarity used for merging. Defaults to [`LevenshteinRatio`].
    pub fn similarity(mut self, similarity: Arc<dyn NameSimilarity>) -> Self {
        self.similarity = Some(similarity);
        self
    }

    pub fn circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker = Some(config);
        self
    }

    /// Lifetime of cached results. Zero (the default) disables caching.
    pub fn cache_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.cache_ttl_seconds = ttl_seconds;
        self
    }

    pub fn build(self) -> DiscoveryEngine {
        DiscoveryEngine {
            orchestrator: SourceOrchestrator::new(
                self.sources,
                self.fused,
                CircuitBreaker::new(self.breaker.unwrap_or_default()),
            ),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryExecutiveStore::new())),
            enricher: self.enricher,
            similarity: self
                .similarity
                .unwrap_or_else(|| Arc::new(LevenshteinRatio)),
            cache: ResultCache::new(self.cache_ttl_seconds),
        }
    }
}
