//! Replay recorded discovery fixtures through the full pipeline.
//!
//! ```text
//! leadscout-replay <fixture.json> [--config PATH] [--db PATH] [--concurrency N]
//! ```
//!
//! Reports are written to stdout as a JSON array; tracing goes to stderr.
//! Ctrl-C cancels the batch: running jobs return partial results and jobs
//! not yet started are reported as `not_started`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use leadscout::{BatchSummary, Fixture, LeadscoutConfig, SqliteExecutiveStore, run_fixture};
use tokio_util::sync::CancellationToken;

const USAGE: &str =
    "usage: leadscout-replay <fixture.json> [--config PATH] [--db PATH] [--concurrency N]";

#[derive(Debug, Default)]
struct Args {
    fixture: PathBuf,
    config: Option<PathBuf>,
    db: Option<PathBuf>,
    concurrency: Option<usize>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut fixture = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                parsed.config = Some(args.next().context("--config needs a path")?.into());
            }
            "--db" => parsed.db = Some(args.next().context("--db needs a path")?.into()),
            "--concurrency" => {
                let value = args.next().context("--concurrency needs a number")?;
                parsed.concurrency = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid --concurrency {value}"))?,
                );
            }
            "-h" | "--help" => bail!(USAGE),
            other if other.starts_with("--") => bail!("unknown option {other}\n{USAGE}"),
            other => {
                if fixture.replace(PathBuf::from(other)).is_some() {
                    bail!("more than one fixture given\n{USAGE}");
                }
            }
        }
    }
    parsed.fixture = fixture.context(USAGE)?;
    Ok(parsed)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("leadscout-replay failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(LeadscoutConfig::default_config_path);
    let mut config = LeadscoutConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(db) = args.db {
        config.store.db_path = db;
    }
    if let Some(concurrency) = args.concurrency {
        config.batch.concurrency = concurrency;
    }
    config.validate()?;

    let fixture = Fixture::load(&args.fixture)
        .with_context(|| format!("loading fixture {}", args.fixture.display()))?;
    let store = Arc::new(SqliteExecutiveStore::open(&config.store.db_path)?);
    tracing::info!(db = %store.path().display(), "executive store ready");

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling batch");
            ctrl_c.cancel();
        }
    });

    let reports = run_fixture(&fixture, &config, store, &cancel).await?;
    let summary = BatchSummary::from_reports(&reports);
    tracing::info!(
        companies = summary.companies,
        completed = summary.completed,
        failed = summary.failed,
        not_started = summary.not_started,
        executives = summary.executives,
        "replay finished"
    );

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_all_options() {
        let parsed = parse_args(args(&[
            "leads.json",
            "--config",
            "cfg.toml",
            "--db",
            "out.db",
            "--concurrency",
            "2",
        ]))
        .expect("parse");
        assert_eq!(parsed.fixture, PathBuf::from("leads.json"));
        assert_eq!(parsed.config, Some(PathBuf::from("cfg.toml")));
        assert_eq!(parsed.db, Some(PathBuf::from("out.db")));
        assert_eq!(parsed.concurrency, Some(2));
    }

    #[test]
    fn fixture_is_required() {
        assert!(parse_args(args(&["--db", "out.db"])).is_err());
    }

    #[test]
    fn rejects_unknown_option_and_bad_number() {
        assert!(parse_args(args(&["leads.json", "--verbose"])).is_err());
        assert!(parse_args(args(&["leads.json", "--concurrency", "many"])).is_err());
        assert!(parse_args(args(&["a.json", "b.json"])).is_err());
    }
}
