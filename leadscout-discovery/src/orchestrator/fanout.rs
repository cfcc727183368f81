//! Concurrent fan-out to discovery sources under per-source and global
//! time budgets.
//!
//! Every source call is wrapped in `catch_unwind` and a per-source
//! `tokio::time::timeout`. The parallel path gathers with a
//! [`FuturesUnordered`] under a global `timeout_at` deadline, raced against
//! the caller's [`CancellationToken`]. Whatever completed before the
//! deadline is returned; outstanding calls are dropped.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_util::sync::CancellationToken;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use crate::source::{ContactSource, FusedSource};
use crate::types::{DiscoveryMethod, RawCandidate, SourceKind, SourceOutcome, SourceStatus};

/// Everything the fan-out produced for one company.
#[derive(Debug, Clone)]
pub struct FanOut {
    /// Raw candidates in completion order.
    pub candidates: Vec<RawCandidate>,
    /// One outcome per attempted or skipped source, ordered by source.
    pub outcomes: Vec<SourceOutcome>,
    pub method: DiscoveryMethod,
}

impl FanOut {
    /// Sources that completed without error, deduplicated and ordered.
    pub fn sources_used(&self) -> Vec<SourceKind> {
        if self.method == DiscoveryMethod::Fused {
            let mut kinds: Vec<SourceKind> = self.candidates.iter().map(|c| c.source).collect();
            kinds.sort();
            kinds.dedup();
            return kinds;
        }
        let mut kinds: Vec<SourceKind> = self
            .outcomes
            .iter()
            .filter(|o| o.status.is_success())
            .map(|o| o.source)
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

/// Result of a single guarded source call.
enum Attempt {
    Succeeded(Vec<RawCandidate>),
    Failed(String),
    TimedOut,
}

/// Fans a discovery job out to the registered sources.
pub struct SourceOrchestrator {
    sources: Vec<Arc<dyn ContactSource>>,
    fused: Option<Arc<dyn FusedSource>>,
    breaker: Mutex<CircuitBreaker>,
}

impl std::fmt::Debug for SourceOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<SourceKind> = self.sources.iter().map(|s| s.kind()).collect();
        f.debug_struct("SourceOrchestrator")
            .field("sources", &kinds)
            .field("fused", &self.fused.as_ref().map(|f| f.name().to_owned()))
            .finish()
    }
}

impl SourceOrchestrator {
    pub fn new(
        sources: Vec<Arc<dyn ContactSource>>,
        fused: Option<Arc<dyn FusedSource>>,
        breaker: CircuitBreaker,
    ) -> Self {
        Self {
            sources,
            fused,
            breaker: Mutex::new(breaker),
        }
    }

    /// Lock the breaker. A poisoned lock still holds valid counters.
    pub fn breaker(&self) -> MutexGuard<'_, CircuitBreaker> {
        self.breaker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run the fan-out for one company. Never fails; partial results are
    /// returned when sources fail, time out, or the caller cancels.
    ///
    /// With a fused source registered and enabled, it runs first. Its
    /// candidates from disabled sources are dropped. If nothing is left, the
    /// per-source path runs once with a fresh budget.
    pub async fn run(
        &self,
        company_name: &str,
        website_url: &str,
        config: &DiscoveryConfig,
        cancel: &CancellationToken,
    ) -> FanOut {
        if config.fused_discovery && !config.enabled_sources.is_empty() {
            if let Some(fused) = &self.fused {
                let mut candidates =
                    run_fused(fused.as_ref(), company_name, website_url, config, cancel).await;
                candidates.retain(|c| config.is_enabled(c.source));
                if !candidates.is_empty() {
                    tracing::debug!(
                        adapter = fused.name(),
                        candidates = candidates.len(),
                        "fused discovery complete"
                    );
                    return FanOut {
                        candidates,
                        outcomes: Vec::new(),
                        method: DiscoveryMethod::Fused,
                    };
                }
                tracing::info!(
                    adapter = fused.name(),
                    "fused discovery found nothing, falling back to per-source path"
                );
            }
        }

        let mut outcomes = Vec::new();
        let mut active: Vec<Arc<dyn ContactSource>> = Vec::new();
        {
            let mut breaker = self.breaker();
            for source in &self.sources {
                let kind = source.kind();
                if !config.is_enabled(kind) {
                    continue;
                }
                if breaker.should_attempt(kind) {
                    active.push(Arc::clone(source));
                } else {
                    tracing::debug!(source = kind.name(), "circuit open, skipping source");
                    outcomes.push(SourceOutcome {
                        source: kind,
                        status: SourceStatus::Skipped,
                        elapsed_ms: 0,
                    });
                }
            }
        }

        let (method, candidates, attempted) = if config.parallel_processing {
            let (c, o) = self
                .run_parallel(&active, company_name, website_url, config, cancel)
                .await;
            (DiscoveryMethod::Parallel, c, o)
        } else {
            let (c, o) = self
                .run_sequential(&active, company_name, website_url, config, cancel)
                .await;
            (DiscoveryMethod::Sequential, c, o)
        };
        outcomes.extend(attempted);
        outcomes.sort_by_key(|o| o.source);

        FanOut {
            candidates,
            outcomes,
            method,
        }
    }

    async fn run_parallel(
        &self,
        active: &[Arc<dyn ContactSource>],
        company_name: &str,
        website_url: &str,
        config: &DiscoveryConfig,
        cancel: &CancellationToken,
    ) -> (Vec<RawCandidate>, Vec<SourceOutcome>) {
        let started = Instant::now();
        let deadline = started + config.global_timeout();

        let mut pending: FuturesUnordered<_> = active
            .iter()
            .enumerate()
            .map(|(idx, source)| {
                let budget = config.source_timeout(source.kind());
                async move {
                    let call_started = Instant::now();
                    let attempt =
                        guarded_call(source.as_ref(), company_name, website_url, budget).await;
                    (idx, attempt, call_started.elapsed())
                }
            })
            .collect();

        let mut finished = vec![false; active.len()];
        let mut candidates = Vec::new();
        let mut outcomes = Vec::with_capacity(active.len());

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!("fan-out cancelled by caller");
                    break;
                }
                next = timeout_at(deadline, pending.next()) => next,
            };
            match next {
                Ok(Some((idx, attempt, elapsed))) => {
                    finished[idx] = true;
                    let kind = active[idx].kind();
                    outcomes.push(self.settle(kind, attempt, elapsed, &mut candidates));
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        budget_ms = config.global_timeout_ms,
                        "global discovery budget exhausted, returning partial results"
                    );
                    break;
                }
            }
        }
        drop(pending);

        let elapsed_ms = elapsed_ms(started.elapsed());
        for (idx, source) in active.iter().enumerate() {
            if !finished[idx] {
                self.breaker().release_trial(source.kind());
                outcomes.push(SourceOutcome {
                    source: source.kind(),
                    status: SourceStatus::Cancelled,
                    elapsed_ms,
                });
            }
        }
        (candidates, outcomes)
    }

    async fn run_sequential(
        &self,
        active: &[Arc<dyn ContactSource>],
        company_name: &str,
        website_url: &str,
        config: &DiscoveryConfig,
        cancel: &CancellationToken,
    ) -> (Vec<RawCandidate>, Vec<SourceOutcome>) {
        let deadline = Instant::now() + config.global_timeout();
        let mut candidates = Vec::new();
        let mut outcomes = Vec::with_capacity(active.len());

        for source in active {
            let kind = source.kind();
            let remaining = deadline.saturating_duration_since(Instant::now());
            if cancel.is_cancelled() || remaining.is_zero() {
                self.breaker().release_trial(kind);
                outcomes.push(SourceOutcome {
                    source: kind,
                    status: SourceStatus::Cancelled,
                    elapsed_ms: 0,
                });
                continue;
            }

            let budget = config.source_timeout(kind).min(remaining);
            let call_started = Instant::now();
            let attempt = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                attempt = guarded_call(source.as_ref(), company_name, website_url, budget) => Some(attempt),
            };
            let elapsed = call_started.elapsed();
            match attempt {
                Some(attempt) => outcomes.push(self.settle(kind, attempt, elapsed, &mut candidates)),
                None => {
                    self.breaker().release_trial(kind);
                    outcomes.push(SourceOutcome {
                        source: kind,
                        status: SourceStatus::Cancelled,
                        elapsed_ms: elapsed_ms(elapsed),
                    });
                }
            }
        }
        (candidates, outcomes)
    }

    /// Turn an attempt into an outcome, update source health and collect
    /// candidates.
    fn settle(
        &self,
        kind: SourceKind,
        attempt: Attempt,
        elapsed: Duration,
        candidates: &mut Vec<RawCandidate>,
    ) -> SourceOutcome {
        let status = match attempt {
            Attempt::Succeeded(mut found) => {
                tracing::debug!(source = kind.name(), candidates = found.len(), "source complete");
                self.breaker().record_success(kind);
                let count = found.len();
                // Adapters may mislabel; the orchestrator knows who answered.
                for candidate in &mut found {
                    candidate.source = kind;
                }
                candidates.append(&mut found);
                SourceStatus::Succeeded { candidates: count }
            }
            Attempt::Failed(reason) => {
                tracing::warn!(source = kind.name(), error = %reason, "source failed");
                self.breaker().record_failure(kind);
                SourceStatus::Failed { reason }
            }
            Attempt::TimedOut => {
                tracing::warn!(
                    source = kind.name(),
                    elapsed_ms = elapsed_ms(elapsed),
                    "source timed out"
                );
                self.breaker().record_failure(kind);
                SourceStatus::TimedOut
            }
        };
        SourceOutcome {
            source: kind,
            status,
            elapsed_ms: elapsed_ms(elapsed),
        }
    }
}

/// Call one source with panic isolation and its own timeout.
async fn guarded_call(
    source: &dyn ContactSource,
    company_name: &str,
    website_url: &str,
    budget: Duration,
) -> Attempt {
    let call = AssertUnwindSafe(source.discover(company_name, website_url)).catch_unwind();
    match timeout(budget, call).await {
        Err(_) => Attempt::TimedOut,
        Ok(Err(panic)) => {
            Attempt::Failed(format!("source panicked: {}", panic_message(&*panic)))
        }
        Ok(Ok(Err(e))) => Attempt::Failed(e.to_string()),
        Ok(Ok(Ok(found))) => Attempt::Succeeded(found),
    }
}

/// Run the fused adapter under its own global budget.
///
/// Any failure is logged and reported as an empty result so the caller
/// falls back to the per-source path.
async fn run_fused(
    fused: &dyn FusedSource,
    company_name: &str,
    website_url: &str,
    config: &DiscoveryConfig,
    cancel: &CancellationToken,
) -> Vec<RawCandidate> {
    let call = AssertUnwindSafe(fused.discover(company_name, website_url)).catch_unwind();
    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => return Vec::new(),
        r = timeout(config.global_timeout(), call) => r,
    };
    let err = match result {
        Ok(Ok(Ok(candidates))) => return candidates,
        Ok(Ok(Err(e))) => e,
        Ok(Err(panic)) => DiscoveryError::Source(format!(
            "fused adapter panicked: {}",
            panic_message(&*panic)
        )),
        Err(_) => DiscoveryError::Timeout(format!(
            "fused adapter exceeded {}ms",
            config.global_timeout_ms
        )),
    };
    tracing::warn!(adapter = fused.name(), error = %err, "fused discovery failed");
    Vec::new()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
