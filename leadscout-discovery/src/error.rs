//! Error types for the leadscout-discovery crate.
//!
//! Only [`DiscoveryError::Config`] ever reaches the caller of a discovery
//! job. The other variants are produced by collaborators (source adapters,
//! stores, enrichers) and are logged and absorbed by the engine.

/// Errors that can occur during executive discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Invalid discovery configuration. Fatal at job start.
    #[error("config error: {0}")]
    Config(String),

    /// A single source adapter failed.
    #[error("source error: {0}")]
    Source(String),

    /// A source or the whole fan-out exceeded its time budget.
    #[error("discovery timed out: {0}")]
    Timeout(String),

    /// Writing results back to storage failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Contact enrichment failed.
    #[error("enrichment error: {0}")]
    Enrichment(String),
}

/// Convenience type alias for leadscout-discovery results.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = DiscoveryError::Config("max_executives_per_company must be > 0".into());
        assert_eq!(
            err.to_string(),
            "config error: max_executives_per_company must be > 0"
        );
    }

    #[test]
    fn display_source() {
        let err = DiscoveryError::Source("directory listing unavailable".into());
        assert_eq!(err.to_string(), "source error: directory listing unavailable");
    }

    #[test]
    fn display_timeout() {
        let err = DiscoveryError::Timeout("exceeded 45s budget".into());
        assert_eq!(err.to_string(), "discovery timed out: exceeded 45s budget");
    }

    #[test]
    fn display_persistence() {
        let err = DiscoveryError::Persistence("database is locked".into());
        assert_eq!(err.to_string(), "persistence error: database is locked");
    }

    #[test]
    fn display_enrichment() {
        let err = DiscoveryError::Enrichment("mx lookup failed".into());
        assert_eq!(err.to_string(), "enrichment error: mx lookup failed");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DiscoveryError>();
    }
}
