//! Configuration for the leadscout application.
//!
//! One TOML document with a section per concern:
//!
//! ```toml
//! [discovery]
//! max_executives_per_company = 10
//! global_timeout_ms = 45000
//!
//! [store]
//! db_path = "/var/lib/leadscout/leadscout.db"
//!
//! [batch]
//! concurrency = 4
//!
//! [rate_limit]
//! max_calls = 30
//! window_secs = 60
//! ```
//!
//! Every field has a default, so a partial (or empty) file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use leadscout_discovery::batch::{DEFAULT_BATCH_CONCURRENCY, MAX_BATCH_CONCURRENCY};
use leadscout_discovery::{DiscoveryConfig, RateLimiter};
use serde::{Deserialize, Serialize};

use crate::error::{LeadscoutError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadscoutConfig {
    /// Per-job discovery settings.
    pub discovery: DiscoveryConfig,
    /// Executive database settings.
    pub store: StoreConfig,
    /// Multi-company batch settings.
    pub batch: BatchConfig,
    /// Limits each source adapter applies to its own calls.
    pub rate_limit: RateLimitConfig,
}

/// Executive database settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: crate::leadscout_dirs::database_file(),
        }
    }
}

/// Multi-company batch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Companies processed at once (1 to 16).
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

/// Per-adapter rate limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Calls allowed per window.
    pub max_calls: u32,
    /// Sliding window length in seconds.
    pub window_secs: u64,
    /// Minimum gap between consecutive calls in milliseconds.
    pub min_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: 30,
            window_secs: 60,
            min_interval_ms: 0,
        }
    }
}

impl RateLimitConfig {
    /// A fresh limiter with these settings, for one adapter.
    pub fn limiter(&self) -> RateLimiter {
        RateLimiter::new(self.max_calls, Duration::from_secs(self.window_secs))
            .with_min_interval(Duration::from_millis(self.min_interval_ms))
    }
}

impl LeadscoutConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| LeadscoutError::Config(e.to_string()))
    }

    /// Load from `path` if it exists, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LeadscoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> PathBuf {
        crate::leadscout_dirs::config_file()
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the discovery engine's config error for the `[discovery]`
    /// section, or [`LeadscoutError::Config`] for the others.
    pub fn validate(&self) -> Result<()> {
        self.discovery.validate()?;
        if !(1..=MAX_BATCH_CONCURRENCY).contains(&self.batch.concurrency) {
            return Err(LeadscoutError::Config(format!(
                "batch.concurrency must be between 1 and {MAX_BATCH_CONCURRENCY}"
            )));
        }
        if self.rate_limit.max_calls == 0 {
            return Err(LeadscoutError::Config(
                "rate_limit.max_calls must be > 0".into(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(LeadscoutError::Config(
                "rate_limit.window_secs must be > 0".into(),
            ));
        }
        if self.store.db_path.as_os_str().is_empty() {
            return Err(LeadscoutError::Config("store.db_path must be set".into()));
        }
        Ok(())
    }
}
