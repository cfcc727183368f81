//! Discovery configuration with sensible defaults.
//!
//! [`DiscoveryConfig`] controls which sources are queried, time budgets,
//! dedup strictness and ranking weights. The scoring constants are the
//! empirically chosen defaults and are kept as configuration, not derived.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;
use crate::types::{SeniorityTier, SourceKind};

/// Dedup similarity threshold used in strict mode.
pub const STRICT_SIMILARITY_THRESHOLD: u8 = 80;

/// Dedup similarity threshold used in lenient mode.
pub const LENIENT_SIMILARITY_THRESHOLD: u8 = 70;

/// Weights for the executive priority score.
///
/// ```text
/// priority = seniority_factor * seniority_weight(tier)
///          + completeness bonuses (email, phone, linkedin, verified)
///          + confidence_factor * overall_confidence
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub seniority_factor: f64,
    pub tier_1: f64,
    pub tier_2: f64,
    pub tier_3: f64,
    pub unknown_tier: f64,
    pub email_bonus: f64,
    pub phone_bonus: f64,
    pub linkedin_bonus: f64,
    pub verified_bonus: f64,
    pub confidence_factor: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            seniority_factor: 0.6,
            tier_1: 0.6,
            tier_2: 0.4,
            tier_3: 0.2,
            unknown_tier: 0.1,
            email_bonus: 0.15,
            phone_bonus: 0.10,
            linkedin_bonus: 0.10,
            verified_bonus: 0.05,
            confidence_factor: 0.1,
        }
    }
}

impl RankingWeights {
    /// Weight for a seniority tier before `seniority_factor` is applied.
    pub fn seniority_weight(&self, tier: SeniorityTier) -> f64 {
        match tier {
            SeniorityTier::Tier1 => self.tier_1,
            SeniorityTier::Tier2 => self.tier_2,
            SeniorityTier::Tier3 => self.tier_3,
            SeniorityTier::Unknown => self.unknown_tier,
        }
    }
}

/// Configuration for one executive discovery job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum number of executives kept after ranking.
    pub max_executives_per_company: usize,
    /// Which sources to query. Empty means "query nothing".
    pub enabled_sources: BTreeSet<SourceKind>,
    /// Launch all sources together (`true`) or one at a time (`false`).
    pub parallel_processing: bool,
    /// Executives below this overall confidence are dropped before ranking.
    pub confidence_threshold: f64,
    /// Explicit dedup threshold on the 0–100 similarity scale. When `None`,
    /// derived from `lenient_matching`.
    pub dedup_similarity_threshold: Option<u8>,
    /// Use the lenient (70) rather than strict (80) dedup threshold.
    pub lenient_matching: bool,
    /// Budget for the whole fan-out, in milliseconds.
    pub global_timeout_ms: u64,
    /// Per-source budgets in milliseconds. Missing sources use
    /// [`SourceKind::default_timeout_ms`].
    pub per_source_timeout_ms: BTreeMap<SourceKind, u64>,
    /// Delay between consecutive jobs in a sequential batch.
    pub delay_between_jobs_ms: u64,
    /// Random jitter range `(min, max)` added to the inter-job delay.
    pub delay_jitter_ms: (u64, u64),
    /// Try the fused adapter first, when one is registered.
    pub fused_discovery: bool,
    /// How long to cache assembled results. 0 disables caching.
    pub cache_ttl_seconds: u64,
    pub ranking: RankingWeights,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_executives_per_company: 10,
            enabled_sources: SourceKind::all().iter().copied().collect(),
            parallel_processing: true,
            confidence_threshold: 0.5,
            dedup_similarity_threshold: None,
            lenient_matching: false,
            global_timeout_ms: 45_000,
            per_source_timeout_ms: SourceKind::all()
                .iter()
                .map(|s| (*s, s.default_timeout_ms()))
                .collect(),
            delay_between_jobs_ms: 0,
            delay_jitter_ms: (0, 0),
            fused_discovery: true,
            cache_ttl_seconds: 0,
            ranking: RankingWeights::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_executives_per_company` must be greater than 0
    /// - `global_timeout_ms` and every per-source timeout must be greater than 0
    /// - `confidence_threshold` must lie in `[0, 1]`
    /// - `dedup_similarity_threshold`, when set, must lie in `1..=100`
    /// - `delay_jitter_ms.0` must be <= `delay_jitter_ms.1`
    /// - ranking weights must be finite and non-negative
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.max_executives_per_company == 0 {
            return Err(DiscoveryError::Config(
                "max_executives_per_company must be greater than 0".into(),
            ));
        }
        if self.global_timeout_ms == 0 {
            return Err(DiscoveryError::Config(
                "global_timeout_ms must be greater than 0".into(),
            ));
        }
        if let Some((source, _)) = self.per_source_timeout_ms.iter().find(|(_, ms)| **ms == 0) {
            return Err(DiscoveryError::Config(format!(
                "per-source timeout for {source} must be greater than 0"
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(DiscoveryError::Config(
                "confidence_threshold must be between 0 and 1".into(),
            ));
        }
        if let Some(threshold) = self.dedup_similarity_threshold {
            if threshold == 0 || threshold > 100 {
                return Err(DiscoveryError::Config(
                    "dedup_similarity_threshold must be between 1 and 100".into(),
                ));
            }
        }
        if self.delay_jitter_ms.0 > self.delay_jitter_ms.1 {
            return Err(DiscoveryError::Config(
                "delay_jitter_ms min must be <= max".into(),
            ));
        }
        let r = &self.ranking;
        let weights = [
            r.seniority_factor,
            r.tier_1,
            r.tier_2,
            r.tier_3,
            r.unknown_tier,
            r.email_bonus,
            r.phone_bonus,
            r.linkedin_bonus,
            r.verified_bonus,
            r.confidence_factor,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(DiscoveryError::Config(
                "ranking weights must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Effective dedup threshold on the 0–100 scale.
    pub fn similarity_threshold(&self) -> u8 {
        self.dedup_similarity_threshold.unwrap_or(if self.lenient_matching {
            LENIENT_SIMILARITY_THRESHOLD
        } else {
            STRICT_SIMILARITY_THRESHOLD
        })
    }

    pub fn global_timeout(&self) -> Duration {
        Duration::from_millis(self.global_timeout_ms)
    }

    /// Budget for one source.
    pub fn source_timeout(&self, source: SourceKind) -> Duration {
        let ms = self
            .per_source_timeout_ms
            .get(&source)
            .copied()
            .unwrap_or_else(|| source.default_timeout_ms());
        Duration::from_millis(ms)
    }

    pub fn is_enabled(&self, source: SourceKind) -> bool {
        self.enabled_sources.contains(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_documented_values() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.max_executives_per_company, 10);
        assert!(config.parallel_processing);
        assert!((config.confidence_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.similarity_threshold(), 80);
        assert_eq!(config.global_timeout(), Duration::from_secs(45));
        assert_eq!(config.delay_between_jobs_ms, 0);
        assert!(config.fused_discovery);
        assert_eq!(config.cache_ttl_seconds, 0);
    }

    #[test]
    fn default_enables_all_sources() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.enabled_sources.len(), 3);
        for source in SourceKind::all() {
            assert!(config.is_enabled(*source));
        }
    }

    #[test]
    fn default_per_source_timeouts() {
        let config = DiscoveryConfig::default();
        assert_eq!(
            config.source_timeout(SourceKind::Website),
            Duration::from_secs(20)
        );
        assert_eq!(
            config.source_timeout(SourceKind::ProfessionalNetwork),
            Duration::from_secs(25)
        );
    }

    #[test]
    fn missing_per_source_timeout_falls_back_to_default() {
        let config = DiscoveryConfig {
            per_source_timeout_ms: BTreeMap::new(),
            ..Default::default()
        };
        assert_eq!(
            config.source_timeout(SourceKind::Directory),
            Duration::from_secs(20)
        );
    }

    #[test]
    fn lenient_matching_lowers_threshold() {
        let config = DiscoveryConfig {
            lenient_matching: true,
            ..Default::default()
        };
        assert_eq!(config.similarity_threshold(), 70);
    }

    #[test]
    fn explicit_threshold_overrides_mode() {
        let config = DiscoveryConfig {
            lenient_matching: true,
            dedup_similarity_threshold: Some(90),
            ..Default::default()
        };
        assert_eq!(config.similarity_threshold(), 90);
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(DiscoveryConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_sources_are_valid() {
        let config = DiscoveryConfig {
            enabled_sources: BTreeSet::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_max_executives_rejected() {
        let config = DiscoveryConfig {
            max_executives_per_company: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_executives_per_company"));
    }

    #[test]
    fn zero_global_timeout_rejected() {
        let config = DiscoveryConfig {
            global_timeout_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("global_timeout_ms"));
    }

    #[test]
    fn zero_source_timeout_rejected() {
        let mut config = DiscoveryConfig::default();
        config
            .per_source_timeout_ms
            .insert(SourceKind::Directory, 0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn out_of_range_confidence_threshold_rejected() {
        let config = DiscoveryConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn out_of_range_similarity_threshold_rejected() {
        let config = DiscoveryConfig {
            dedup_similarity_threshold: Some(101),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = DiscoveryConfig {
            dedup_similarity_threshold: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_jitter_range_rejected() {
        let config = DiscoveryConfig {
            delay_jitter_ms: (500, 100),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jitter"));
    }

    #[test]
    fn negative_ranking_weight_rejected() {
        let mut config = DiscoveryConfig::default();
        config.ranking.email_bonus = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ranking"));
    }

    #[test]
    fn seniority_weights_match_defaults() {
        let weights = RankingWeights::default();
        assert!((weights.seniority_weight(SeniorityTier::Tier1) - 0.6).abs() < f64::EPSILON);
        assert!((weights.seniority_weight(SeniorityTier::Tier2) - 0.4).abs() < f64::EPSILON);
        assert!((weights.seniority_weight(SeniorityTier::Tier3) - 0.2).abs() < f64::EPSILON);
        assert!((weights.seniority_weight(SeniorityTier::Unknown) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = DiscoveryConfig {
            parallel_processing: false,
            delay_between_jobs_ms: 1500,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let decoded: DiscoveryConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, config);
    }
}
