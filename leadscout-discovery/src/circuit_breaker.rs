//! Per-source circuit breaker.
//!
//! Tracks consecutive failures per discovery source and temporarily skips
//! sources that fail repeatedly. After a cooldown, a tripped source enters a
//! half-open state where a single trial call decides whether to restore or
//! re-trip the circuit. While that trial call is in flight, other callers are
//! refused.
//!
//! # State Machine
//!
//! ```text
//! ┌────────┐  N failures   ┌────────┐  cooldown   ┌──────────┐
//! │ Closed ├──────────────►│  Open  ├────────────►│ HalfOpen │
//! └───▲────┘               └────────┘             └────┬─────┘
//!     │                         ▲                      │
//!     │  success                │  failure              │
//!     └─────────────────────────┴──────────────────────┘
//! ```
//!
//! A breaker belongs to one [`DiscoveryEngine`](crate::DiscoveryEngine);
//! engines never share health state.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::types::SourceKind;

/// Circuit state for a single source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Healthy; calls go through.
    Closed,
    /// Failed too often; calls are skipped until the cooldown expires.
    Open,
    /// Cooldown elapsed; one trial call is allowed.
    HalfOpen,
}

/// Health tracking data for a single source.
#[derive(Debug, Clone)]
pub struct SourceHealth {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub last_failure_at: Option<Instant>,
    pub last_success_at: Option<Instant>,
    /// A half-open trial call has been handed out and not yet settled.
    pub trial_in_flight: bool,
}

impl Default for SourceHealth {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
            last_success_at: None,
            trial_in_flight: false,
        }
    }
}

/// Configuration for circuit breaker behaviour.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// Time spent open before a trial call is allowed.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Per-source circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    sources: BTreeMap<SourceKind, SourceHealth>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            sources: BTreeMap::new(),
        }
    }

    /// Record a successful call. Closes the circuit from any state.
    pub fn record_success(&mut self, source: SourceKind) {
        let health = self.sources.entry(source).or_default();
        health.state = CircuitState::Closed;
        health.consecutive_failures = 0;
        health.last_success_at = Some(Instant::now());
        health.trial_in_flight = false;
    }

    /// Record a failed call (error, timeout or panic).
    ///
    /// Opens the circuit once the failure threshold is reached; a failed
    /// half-open trial call re-opens it immediately.
    pub fn record_failure(&mut self, source: SourceKind) {
        let threshold = self.config.failure_threshold;
        let health = self.sources.entry(source).or_default();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        health.last_failure_at = Some(Instant::now());
        health.trial_in_flight = false;

        if health.state == CircuitState::HalfOpen || health.consecutive_failures >= threshold {
            if health.state != CircuitState::Open {
                tracing::warn!(
                    source = source.name(),
                    failures = health.consecutive_failures,
                    "circuit opened"
                );
            }
            health.state = CircuitState::Open;
        }
    }

    /// Whether a call to `source` should be attempted now.
    ///
    /// An open circuit whose cooldown has elapsed moves to half-open and
    /// hands out one trial call. Until that trial call is settled with
    /// [`record_success`](Self::record_success),
    /// [`record_failure`](Self::record_failure) or
    /// [`release_trial`](Self::release_trial), further calls are refused.
    pub fn should_attempt(&mut self, source: SourceKind) -> bool {
        let cooldown = self.config.cooldown;
        let health = self.sources.entry(source).or_default();

        match health.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => {
                if health.trial_in_flight {
                    return false;
                }
                health.trial_in_flight = true;
                true
            }
            CircuitState::Open => {
                let cooldown_elapsed = match health.last_failure_at {
                    Some(t) => t.elapsed() >= cooldown,
                    None => true,
                };
                if cooldown_elapsed {
                    health.state = CircuitState::HalfOpen;
                    health.trial_in_flight = true;
                    tracing::debug!(
                        source = source.name(),
                        "circuit half-open, trial call allowed"
                    );
                }
                cooldown_elapsed
            }
        }
    }

    /// Give back a half-open trial that ended without a verdict
    /// (cancelled or cut off by the global deadline).
    pub fn release_trial(&mut self, source: SourceKind) {
        if let Some(health) = self.sources.get_mut(&source) {
            health.trial_in_flight = false;
        }
    }

    /// Current state for `source`. Unseen sources are closed.
    pub fn status(&self, source: SourceKind) -> CircuitState {
        self.sources
            .get(&source)
            .map_or(CircuitState::Closed, |h| h.state)
    }

    /// `(source, state, consecutive_failures)` for every source seen so far.
    pub fn health_report(&self) -> Vec<(SourceKind, CircuitState, u32)> {
        self.sources
            .iter()
            .map(|(source, health)| (*source, health.state, health.consecutive_failures))
            .collect()
    }

    /// Forget all health state.
    pub fn reset(&mut self) {
        self.sources.clear();
    }
}
