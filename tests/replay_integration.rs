//! End-to-end replay runs: fixture → engine → SQLite store → reports.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use leadscout::{
    Fixture, JobStatus, LeadscoutConfig, LeadscoutError, SqliteExecutiveStore, run_fixture,
};
use leadscout_discovery::{SeniorityTier, SourceKind, SourceStatus};
use tokio_util::sync::CancellationToken;

fn demo_fixture() -> Fixture {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("uk_trades.json");
    Fixture::load(&path).expect("demo fixture")
}

fn config_in(dir: &tempfile::TempDir) -> LeadscoutConfig {
    let mut config = LeadscoutConfig::default();
    config.store.db_path = dir.path().join("leads.db");
    config.batch.concurrency = 2;
    config
}

#[tokio::test]
async fn replay_resolves_and_persists_every_company() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(&dir);
    let store = Arc::new(SqliteExecutiveStore::open(&config.store.db_path).expect("store"));

    let reports = run_fixture(
        &demo_fixture(),
        &config,
        store.clone(),
        &CancellationToken::new(),
    )
    .await
    .expect("replay");

    let ids: Vec<&str> = reports.iter().map(|r| r.company_id.as_str()).collect();
    assert_eq!(ids, ["c-jack", "c-mitchell", "c-acme"]);
    assert!(reports.iter().all(|r| r.status == JobStatus::Completed));

    let jack = reports[0].result.as_ref().expect("jack result");
    assert_eq!(jack.executives.len(), 1);
    assert_eq!(jack.executives[0].full_name(), "Jack Plumber");
    assert_eq!(jack.candidates_rejected, 1);

    let mitchell = reports[1].result.as_ref().expect("mitchell result");
    let primary = mitchell.primary_decision_maker.as_ref().expect("primary");
    assert_eq!(primary.full_name(), "Sarah Mitchell");
    assert_eq!(primary.tier(), SeniorityTier::Tier1);
    assert!(primary.person.linkedin_verified);
    assert_eq!(
        primary.person.sources,
        BTreeSet::from([SourceKind::Website, SourceKind::ProfessionalNetwork])
    );
    assert_eq!(
        mitchell.sources_used,
        vec![SourceKind::Website, SourceKind::ProfessionalNetwork]
    );
    let directory = mitchell
        .source_outcomes
        .iter()
        .find(|o| o.source == SourceKind::Directory)
        .expect("directory outcome");
    assert!(matches!(directory.status, SourceStatus::Failed { .. }));

    let acme = reports[2].result.as_ref().expect("acme result");
    assert!(acme.executives.is_empty());
    assert!(acme.primary_decision_maker.is_none());

    let stored = store.executives_for("c-mitchell").expect("read");
    assert_eq!(stored.len(), mitchell.executives.len());
    assert_eq!(stored[0].executive.full_name(), "Sarah Mitchell");
    assert_eq!(store.executives_for("c-jack").expect("read").len(), 1);
}

#[tokio::test]
async fn rerun_replaces_stored_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(&dir);
    let store = Arc::new(SqliteExecutiveStore::open(&config.store.db_path).expect("store"));
    let fixture = demo_fixture();

    for _ in 0..2 {
        run_fixture(&fixture, &config, store.clone(), &CancellationToken::new())
            .await
            .expect("replay");
    }

    assert_eq!(store.executives_for("c-jack").expect("read").len(), 1);
}

#[tokio::test]
async fn cancelled_batch_starts_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(&dir);
    let store = Arc::new(SqliteExecutiveStore::open(&config.store.db_path).expect("store"));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let reports = run_fixture(&demo_fixture(), &config, store.clone(), &cancel)
        .await
        .expect("replay");

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.status == JobStatus::NotStarted));
    assert_eq!(store.company_count().expect("count"), 0);
}

#[tokio::test]
async fn invalid_config_rejected_before_any_job() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(&dir);
    config.discovery.max_executives_per_company = 0;
    let store = Arc::new(SqliteExecutiveStore::open(&config.store.db_path).expect("store"));

    let err = run_fixture(&demo_fixture(), &config, store.clone(), &CancellationToken::new())
        .await
        .expect_err("invalid");

    assert!(matches!(err, LeadscoutError::Discovery(_)));
    assert_eq!(store.company_count().expect("count"), 0);
}

#[tokio::test]
async fn sequential_single_worker_matches_parallel() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(&dir);
    let store = Arc::new(SqliteExecutiveStore::open(&config.store.db_path).expect("store"));
    let fixture = demo_fixture();

    let parallel = run_fixture(&fixture, &config, store.clone(), &CancellationToken::new())
        .await
        .expect("parallel");

    config.batch.concurrency = 1;
    config.discovery.parallel_processing = false;
    config.discovery.delay_between_jobs_ms = 0;
    config.discovery.delay_jitter_ms = (0, 0);
    let sequential = run_fixture(&fixture, &config, store, &CancellationToken::new())
        .await
        .expect("sequential");

    for (a, b) in parallel.iter().zip(&sequential) {
        let names = |r: &leadscout::JobReport| -> Vec<String> {
            r.result
                .as_ref()
                .map(|res| {
                    res.executives
                        .iter()
                        .map(|e| e.full_name().to_owned())
                        .collect()
                })
                .unwrap_or_default()
        };
        assert_eq!(names(a), names(b));
    }
}
