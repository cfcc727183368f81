//! Error types for the leadscout application.

use leadscout_discovery::DiscoveryError;

/// Top-level error type for the leadscout application shell.
#[derive(Debug, thiserror::Error)]
pub enum LeadscoutError {
    /// Configuration file could not be parsed or is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite executive store error.
    #[error("store error: {0}")]
    Store(String),

    /// Discovery engine error.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Replay fixture could not be read or is malformed.
    #[error("fixture error: {0}")]
    Fixture(String),
}

impl From<rusqlite::Error> for LeadscoutError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(e.to_string())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LeadscoutError>;
