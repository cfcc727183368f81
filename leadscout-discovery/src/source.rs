//! Trait definitions for pluggable discovery sources.
//!
//! Each discovery channel (website, professional network, business
//! directory) implements [`ContactSource`] to provide a uniform interface
//! for producing [`RawCandidate`] values. A [`FusedSource`] combines several
//! channels internally and is tried before the per-source path.

use async_trait::async_trait;

use crate::error::DiscoveryError;
use crate::types::{RawCandidate, SourceKind};

/// A pluggable discovery source adapter.
///
/// Implementors handle their own:
///
/// - HTTP requests and anti-bot measures
/// - HTML parsing and name/title extraction
/// - Rate limiting (see [`crate::rate_limit::RateLimiter`])
///
/// Adapters are raced against a per-source timeout and dropped when it
/// fires, so they must be cancel-safe. All implementations must be
/// `Send + Sync` for concurrent fan-out.
#[async_trait]
pub trait ContactSource: Send + Sync {
    /// Which channel this adapter covers.
    fn kind(&self) -> SourceKind;

    /// Discover executive-like candidates for one company.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] if the source is unreachable, blocks the
    /// request, or returns something unparseable. The orchestrator logs the
    /// error and carries on with the other sources.
    async fn discover(
        &self,
        company_name: &str,
        website_url: &str,
    ) -> Result<Vec<RawCandidate>, DiscoveryError>;
}

/// A discovery path that queries several channels internally.
///
/// Candidates still carry their originating [`SourceKind`].
#[async_trait]
pub trait FusedSource: Send + Sync {
    /// Human-readable adapter name for logs.
    fn name(&self) -> &str;

    async fn discover(
        &self,
        company_name: &str,
        website_url: &str,
    ) -> Result<Vec<RawCandidate>, DiscoveryError>;
}
