//! Discovery for many companies with bounded job-level concurrency.
//!
//! Jobs are spawned onto the runtime behind a [`Semaphore`]. With a
//! concurrency of one the runner behaves as a polite sequential crawler and
//! waits `delay_between_jobs_ms` plus random jitter between jobs.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::DiscoveryConfig;
use crate::engine::DiscoveryEngine;
use crate::error::{DiscoveryError, Result};
use crate::types::{DiscoveryJob, DiscoveryResult};

/// Default number of companies processed at once.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Upper bound on job concurrency.
pub const MAX_BATCH_CONCURRENCY: usize = 16;

/// What happened to one job in a batch.
#[derive(Debug)]
pub enum JobOutcome {
    Completed(DiscoveryResult),
    Failed(DiscoveryError),
    /// The batch was cancelled before this job started.
    NotStarted,
}

/// One entry per submitted job, in submission order.
#[derive(Debug)]
pub struct BatchOutcome {
    pub company_id: String,
    pub outcome: JobOutcome,
}

impl BatchOutcome {
    pub fn result(&self) -> Option<&DiscoveryResult> {
        match &self.outcome {
            JobOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }
}

/// Runs discovery jobs against one engine.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    engine: Arc<DiscoveryEngine>,
    concurrency: usize,
}

impl BatchRunner {
    /// Create a runner allowing `concurrency` jobs at once.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Config`] unless `1 <= concurrency <= 16`.
    pub fn new(engine: Arc<DiscoveryEngine>, concurrency: usize) -> Result<Self> {
        if !(1..=MAX_BATCH_CONCURRENCY).contains(&concurrency) {
            return Err(DiscoveryError::Config(format!(
                "batch concurrency must be between 1 and {MAX_BATCH_CONCURRENCY}, got {concurrency}"
            )));
        }
        Ok(Self {
            engine,
            concurrency,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every job and return their outcomes in input order.
    ///
    /// Cancelling `cancel` stops new jobs from starting and cancels the
    /// fan-out of running ones; they still return partial results.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Config`] if `config` is invalid. No job is
    /// started in that case.
    pub async fn run(
        &self,
        jobs: Vec<DiscoveryJob>,
        config: &DiscoveryConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<BatchOutcome>> {
        config.validate()?;

        let total = jobs.len();
        let config = Arc::new(config.clone());
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut company_ids = Vec::with_capacity(total);
        let mut handles: Vec<Option<JoinHandle<Result<DiscoveryResult>>>> =
            Vec::with_capacity(total);

        for (idx, job) in jobs.into_iter().enumerate() {
            company_ids.push(job.company_id.clone());

            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                handles.push(None);
                continue;
            };

            if idx > 0 && self.concurrency == 1 {
                let delay = inter_job_delay(&config);
                if !delay.is_zero() {
                    tracing::debug!(
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "waiting between jobs"
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => {}
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
            if cancel.is_cancelled() {
                handles.push(None);
                continue;
            }

            let engine = Arc::clone(&self.engine);
            let config = Arc::clone(&config);
            let cancel = cancel.clone();
            handles.push(Some(tokio::spawn(async move {
                let _permit = permit;
                engine.discover_job(&job, &config, &cancel).await
            })));
        }

        let mut outcomes = Vec::with_capacity(total);
        let mut completed = 0usize;
        for (company_id, handle) in company_ids.into_iter().zip(handles) {
            let outcome = match handle {
                None => JobOutcome::NotStarted,
                Some(handle) => match handle.await {
                    Ok(Ok(result)) => {
                        completed += 1;
                        JobOutcome::Completed(result)
                    }
                    Ok(Err(e)) => JobOutcome::Failed(e),
                    Err(join_err) => {
                        tracing::warn!(error = %join_err, "discovery job aborted");
                        JobOutcome::Failed(DiscoveryError::Source(format!(
                            "job aborted: {join_err}"
                        )))
                    }
                },
            };
            outcomes.push(BatchOutcome {
                company_id,
                outcome,
            });
        }

        tracing::info!(total, completed, "batch complete");
        Ok(outcomes)
    }
}

/// Base delay plus uniform jitter from `delay_jitter_ms`.
fn inter_job_delay(config: &DiscoveryConfig) -> Duration {
    let (min, max) = config.delay_jitter_ms;
    let jitter = if max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    Duration::from_millis(config.delay_between_jobs_ms.saturating_add(jitter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ContactSource;
    use crate::types::{RawCandidate, SourceKind};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Sleeps, then returns one owner named after the company.
    struct SlowSource {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ContactSource for SlowSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Website
        }

        async fn discover(
            &self,
            company_name: &str,
            _: &str,
        ) -> std::result::Result<Vec<RawCandidate>, DiscoveryError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![RawCandidate::new(SourceKind::Website, company_name)
                .with_title("Owner")
                .with_confidence(0.9)])
        }
    }

    fn setup(delay_ms: u64) -> (Arc<SlowSource>, Arc<DiscoveryEngine>) {
        let source = Arc::new(SlowSource {
            delay: Duration::from_millis(delay_ms),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let engine = Arc::new(DiscoveryEngine::builder().source(source.clone()).build());
        (source, engine)
    }

    fn jobs(names: &[&str]) -> Vec<DiscoveryJob> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| DiscoveryJob::new(format!("c-{i}"), *name, "https://example.co.uk"))
            .collect()
    }

    const NAMES: [&str; 6] = [
        "Jane Doe",
        "John Smith",
        "Sarah Jones",
        "David Brown",
        "Emma Wilson",
        "Paul Taylor",
    ];

    #[test]
    fn concurrency_bounds_validated() {
        let (_, engine) = setup(0);
        assert!(BatchRunner::new(Arc::clone(&engine), 0).is_err());
        assert!(BatchRunner::new(Arc::clone(&engine), 17).is_err());
        assert!(BatchRunner::new(Arc::clone(&engine), 1).is_ok());
        assert!(BatchRunner::new(engine, MAX_BATCH_CONCURRENCY).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn outcomes_keep_input_order() {
        let (_, engine) = setup(100);
        let runner = BatchRunner::new(engine, DEFAULT_BATCH_CONCURRENCY).expect("runner");
        let outcomes = runner
            .run(jobs(&NAMES), &DiscoveryConfig::default(), &CancellationToken::new())
            .await
            .expect("batch");
        let ids: Vec<&str> = outcomes.iter().map(|o| o.company_id.as_str()).collect();
        assert_eq!(ids, ["c-0", "c-1", "c-2", "c-3", "c-4", "c-5"]);
        for (outcome, name) in outcomes.iter().zip(NAMES) {
            let result = outcome.result().expect("completed");
            assert_eq!(result.company_name, name);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_is_bounded() {
        let (source, engine) = setup(1_000);
        let runner = BatchRunner::new(engine, 2).expect("runner");
        runner
            .run(jobs(&NAMES), &DiscoveryConfig::default(), &CancellationToken::new())
            .await
            .expect("batch");
        assert_eq!(source.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_batch_waits_between_jobs() {
        let (source, engine) = setup(0);
        let runner = BatchRunner::new(engine, 1).expect("runner");
        let config = DiscoveryConfig {
            delay_between_jobs_ms: 1_000,
            delay_jitter_ms: (0, 500),
            ..DiscoveryConfig::default()
        };
        let started = Instant::now();
        runner
            .run(jobs(&NAMES[..3]), &config, &CancellationToken::new())
            .await
            .expect("batch");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(2_000));
        assert!(elapsed <= Duration::from_millis(3_100));
        assert_eq!(source.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_new_jobs() {
        let (_, engine) = setup(0);
        let runner = BatchRunner::new(engine, 1).expect("runner");
        let config = DiscoveryConfig {
            delay_between_jobs_ms: 10_000,
            ..DiscoveryConfig::default()
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5_000)).await;
            trigger.cancel();
        });
        let outcomes = runner
            .run(jobs(&NAMES[..3]), &config, &cancel)
            .await
            .expect("batch");
        assert!(outcomes[0].result().is_some());
        assert!(matches!(outcomes[1].outcome, JobOutcome::NotStarted));
        assert!(matches!(outcomes[2].outcome, JobOutcome::NotStarted));
    }

    #[tokio::test]
    async fn invalid_config_starts_nothing() {
        let (source, engine) = setup(0);
        let runner = BatchRunner::new(engine, 2).expect("runner");
        let config = DiscoveryConfig {
            global_timeout_ms: 0,
            ..DiscoveryConfig::default()
        };
        let err = runner
            .run(jobs(&NAMES), &config, &CancellationToken::new())
            .await
            .expect_err("invalid config");
        assert!(matches!(err, DiscoveryError::Config(_)));
        assert_eq!(source.in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(source.peak.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn delay_without_jitter_is_exact() {
        let config = DiscoveryConfig {
            delay_between_jobs_ms: 250,
            ..DiscoveryConfig::default()
        };
        assert_eq!(inter_job_delay(&config), Duration::from_millis(250));
    }

    #[test]
    fn jitter_stays_in_range() {
        let config = DiscoveryConfig {
            delay_between_jobs_ms: 100,
            delay_jitter_ms: (10, 20),
            ..DiscoveryConfig::default()
        };
        for _ in 0..50 {
            let delay = inter_job_delay(&config);
            assert!(delay >= Duration::from_millis(110));
            assert!(delay <= Duration::from_millis(120));
        }
    }

    #[test]
    fn delay_saturates_instead_of_wrapping() {
        let config = DiscoveryConfig {
            delay_between_jobs_ms: u64::MAX,
            delay_jitter_ms: (1, 1),
            ..DiscoveryConfig::default()
        };
        assert_eq!(inter_job_delay(&config), Duration::from_millis(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn maximal_delay_is_cut_short_by_cancellation() {
        let (_, engine) = setup(0);
        let runner = BatchRunner::new(engine, 1).expect("runner");
        let config = DiscoveryConfig {
            delay_between_jobs_ms: u64::MAX,
            ..DiscoveryConfig::default()
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1_000)).await;
            trigger.cancel();
        });
        let started = Instant::now();
        let outcomes = runner
            .run(jobs(&NAMES[..2]), &config, &cancel)
            .await
            .expect("batch");
        assert!(started.elapsed() <= Duration::from_millis(1_100));
        assert!(outcomes[0].result().is_some());
        assert!(matches!(outcomes[1].outcome, JobOutcome::NotStarted));
    }
}
