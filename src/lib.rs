//! Leadscout: executive contact resolution for small-business lead lists.
//!
//! The discovery pipeline itself lives in [`leadscout_discovery`]. This crate
//! wraps it as an application:
//!
//! - **Config**: one TOML file with `[discovery]`, `[store]`, `[batch]` and
//!   `[rate_limit]` sections
//! - **Store**: SQLite write-back of each company's ranked executives
//! - **Replay**: fixture-driven source adapters for offline runs
//! - **Reports**: JSON-friendly per-company batch outcomes

pub mod config;
pub mod error;
pub mod leadscout_dirs;
pub mod replay;
pub mod report;
pub mod store;

pub use config::{BatchConfig, LeadscoutConfig, RateLimitConfig, StoreConfig};
pub use error::{LeadscoutError, Result};
pub use replay::{Fixture, FixtureCompany, ReplaySource, run_fixture};
pub use report::{BatchSummary, JobReport, JobStatus};
pub use store::SqliteExecutiveStore;
