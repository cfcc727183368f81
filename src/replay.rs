//! Fixture-driven source adapters.
//!
//! A fixture is a JSON file describing what each discovery channel would
//! return for a set of companies. [`ReplaySource`] serves those candidates
//! through the engine's [`ContactSource`] contract, so complete discovery
//! runs can be reproduced offline.
//!
//! ```json
//! {
//!   "companies": [
//!     {
//!       "company_id": "c-1",
//!       "company_name": "Jack The Plumber",
//!       "website_url": "https://jacktheplumber.co.uk",
//!       "trade": "plumbing",
//!       "candidates": [
//!         { "source": "website", "raw_name": "Jack", "title": "Owner" }
//!       ],
//!       "failing_sources": ["professional_network"],
//!       "latency_ms": { "directory": 1500 }
//!     }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leadscout_discovery::{
    BatchRunner, ContactSource, DiscoveryEngine, DiscoveryError, DiscoveryJob, ExecutiveStore,
    RateLimiter, RawCandidate, SourceKind,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::{LeadscoutConfig, RateLimitConfig};
use crate::error::{LeadscoutError, Result};
use crate::report::JobReport;

/// A set of recorded companies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub companies: Vec<FixtureCompany>,
}

/// What every channel returns for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureCompany {
    pub company_id: String,
    pub company_name: String,
    pub website_url: String,
    #[serde(default)]
    pub trade: Option<String>,
    /// Candidates from all channels; each carries its own source.
    #[serde(default)]
    pub candidates: Vec<RawCandidate>,
    /// Channels that answer this company with an error.
    #[serde(default)]
    pub failing_sources: BTreeSet<SourceKind>,
    /// Simulated response time per channel.
    #[serde(default)]
    pub latency_ms: BTreeMap<SourceKind, u64>,
}

impl Fixture {
    /// Read a fixture from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`LeadscoutError::Io`] if the file cannot be read and
    /// [`LeadscoutError::Fixture`] if it is not a valid fixture.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a fixture from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LeadscoutError::Fixture`] on malformed JSON, duplicate
    /// company ids, or company names that differ only in case or padding.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: Self =
            serde_json::from_str(json).map_err(|e| LeadscoutError::Fixture(e.to_string()))?;
        let mut ids = BTreeSet::new();
        let mut names = BTreeSet::new();
        for company in &fixture.companies {
            if !ids.insert(company.company_id.as_str()) {
                return Err(LeadscoutError::Fixture(format!(
                    "duplicate company_id {}",
                    company.company_id
                )));
            }
            if !names.insert(lookup_key(&company.company_name)) {
                return Err(LeadscoutError::Fixture(format!(
                    "duplicate company_name {}",
                    company.company_name
                )));
            }
        }
        Ok(fixture)
    }

    /// One discovery job per company, in fixture order.
    pub fn jobs(&self) -> Vec<DiscoveryJob> {
        self.companies
            .iter()
            .map(|c| {
                let job = DiscoveryJob::new(&c.company_id, &c.company_name, &c.website_url);
                match &c.trade {
                    Some(trade) => job.with_trade(trade),
                    None => job,
                }
            })
            .collect()
    }

    /// One replay adapter per channel, each with its own rate limiter.
    pub fn sources(&self, limits: &RateLimitConfig) -> Vec<Arc<dyn ContactSource>> {
        SourceKind::all()
            .iter()
            .map(|&kind| {
                Arc::new(ReplaySource::from_fixture(self, kind, limits.limiter()))
                    as Arc<dyn ContactSource>
            })
            .collect()
    }

    /// Build an engine over this fixture's adapters, writing to `store`.
    pub fn engine(
        &self,
        config: &LeadscoutConfig,
        store: Arc<dyn ExecutiveStore>,
    ) -> DiscoveryEngine {
        self.sources(&config.rate_limit)
            .into_iter()
            .fold(DiscoveryEngine::builder(), |builder, source| {
                builder.source(source)
            })
            .store(store)
            .cache_ttl_seconds(config.discovery.cache_ttl_seconds)
            .build()
    }
}

/// Run every company in `fixture` as one batch, writing results to `store`.
///
/// # Errors
///
/// Returns an error if `config` is invalid. Per-company failures are
/// reported in the returned list instead.
pub async fn run_fixture(
    fixture: &Fixture,
    config: &LeadscoutConfig,
    store: Arc<dyn ExecutiveStore>,
    cancel: &CancellationToken,
) -> Result<Vec<JobReport>> {
    config.validate()?;
    let engine = Arc::new(fixture.engine(config, store));
    let runner = BatchRunner::new(engine, config.batch.concurrency)?;
    tracing::info!(
        companies = fixture.companies.len(),
        concurrency = runner.concurrency(),
        "replaying fixture"
    );
    let outcomes = runner.run(fixture.jobs(), &config.discovery, cancel).await?;
    Ok(outcomes.into_iter().map(JobReport::from).collect())
}

#[derive(Debug, Clone, Default)]
struct ReplayEntry {
    candidates: Vec<RawCandidate>,
    fails: bool,
    latency: Duration,
}

/// Serves one channel's recorded candidates.
#[derive(Debug)]
pub struct ReplaySource {
    kind: SourceKind,
    limiter: RateLimiter,
    entries: HashMap<String, ReplayEntry>,
}

impl ReplaySource {
    /// Extract `kind`'s share of `fixture`.
    pub fn from_fixture(fixture: &Fixture, kind: SourceKind, limiter: RateLimiter) -> Self {
        let entries = fixture
            .companies
            .iter()
            .map(|company| {
                let entry = ReplayEntry {
                    candidates: company
                        .candidates
                        .iter()
                        .filter(|c| c.source == kind)
                        .cloned()
                        .collect(),
                    fails: company.failing_sources.contains(&kind),
                    latency: Duration::from_millis(
                        company.latency_ms.get(&kind).copied().unwrap_or(0),
                    ),
                };
                (lookup_key(&company.company_name), entry)
            })
            .collect();
        Self {
            kind,
            limiter,
            entries,
        }
    }
}

fn lookup_key(company_name: &str) -> String {
    company_name.trim().to_lowercase()
}

#[async_trait]
impl ContactSource for ReplaySource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn discover(
        &self,
        company_name: &str,
        _website_url: &str,
    ) -> std::result::Result<Vec<RawCandidate>, DiscoveryError> {
        self.limiter.acquire().await;

        let Some(entry) = self.entries.get(&lookup_key(company_name)) else {
            tracing::trace!(source = %self.kind, "company not in fixture");
            return Ok(Vec::new());
        };
        if !entry.latency.is_zero() {
            tokio::time::sleep(entry.latency).await;
        }
        if entry.fails {
            return Err(DiscoveryError::Source(format!(
                "{} unavailable",
                self.kind
            )));
        }
        Ok(entry.candidates.clone())
    }
}
