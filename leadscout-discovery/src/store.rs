//! Persistence write-back contract.
//!
//! The engine upserts each job's final executives through an
//! [`ExecutiveStore`]. Failures are reported to the caller as
//! [`DiscoveryError::Persistence`] and logged by the engine; they never fail
//! a discovery job.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::DiscoveryError;
use crate::types::Executive;

/// Write-back interface for discovery results.
#[async_trait]
pub trait ExecutiveStore: Send + Sync {
    /// Replace the stored executives for `company_id` with `executives`.
    async fn save_executives(
        &self,
        company_id: &str,
        executives: &[Executive],
    ) -> Result<(), DiscoveryError>;
}

/// Process-local store, mainly for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryExecutiveStore {
    companies: Mutex<HashMap<String, Vec<Executive>>>,
}

impl InMemoryExecutiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executives currently stored for `company_id`.
    pub fn executives_for(&self, company_id: &str) -> Vec<Executive> {
        self.companies
            .lock()
            .map(|map| map.get(company_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Number of companies with stored results.
    pub fn company_count(&self) -> usize {
        self.companies.lock().map(|map| map.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ExecutiveStore for InMemoryExecutiveStore {
    async fn save_executives(
        &self,
        company_id: &str,
        executives: &[Executive],
    ) -> Result<(), DiscoveryError> {
        let mut map = self
            .companies
            .lock()
            .map_err(|e| DiscoveryError::Persistence(format!("store lock poisoned: {e}")))?;
        map.insert(company_id.to_owned(), executives.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::dedup::into_executive;
    use crate::types::{DiscoveryMethod, Person, SeniorityTier, SourceKind};
    use std::collections::BTreeSet;

    fn exec(name: &str) -> Executive {
        let (first, last) = name.split_once(' ').unwrap_or((name, ""));
        into_executive(
            Person {
                first_name: first.into(),
                last_name: last.into(),
                full_name: name.into(),
                title: "Director".into(),
                seniority_tier: SeniorityTier::Tier2,
                email: None,
                email_confidence: 0.0,
                phone: None,
                phone_confidence: 0.0,
                linkedin_url: None,
                linkedin_verified: false,
                sources: BTreeSet::from([SourceKind::Website]),
                validation_confidence: 0.8,
                synthesized_surname: false,
            },
            DiscoveryMethod::Parallel,
        )
    }

    #[tokio::test]
    async fn save_then_read_back() {
        let store = InMemoryExecutiveStore::new();
        store
            .save_executives("c-1", &[exec("Jane Doe")])
            .await
            .expect("save");
        let stored = store.executives_for("c-1");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].full_name(), "Jane Doe");
    }

    #[tokio::test]
    async fn save_replaces_previous_rows() {
        let store = InMemoryExecutiveStore::new();
        store
            .save_executives("c-1", &[exec("Jane Doe"), exec("John Smith")])
            .await
            .expect("first save");
        store
            .save_executives("c-1", &[exec("Robert Brown")])
            .await
            .expect("second save");
        let stored = store.executives_for("c-1");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].full_name(), "Robert Brown");
        assert_eq!(store.company_count(), 1);
    }

    #[test]
    fn unknown_company_is_empty() {
        let store = InMemoryExecutiveStore::new();
        assert!(store.executives_for("missing").is_empty());
    }
}
