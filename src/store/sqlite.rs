//! SQLite-backed executive store.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadscout_discovery::{DiscoveryError, Executive, ExecutiveStore};
use rusqlite::{Connection, params};

use super::schema::{apply_schema, read_schema_version};
use crate::error::{LeadscoutError, Result};

/// One persisted executive with its rank and write time.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredExecutive {
    /// Zero-based position in the company's ranked list.
    pub rank: usize,
    pub executive: Executive,
    pub saved_at: DateTime<Utc>,
}

/// SQLite executive store.
///
/// The connection sits behind a `Mutex` and blocking calls run on the
/// tokio blocking pool, so the store can be shared across batch jobs.
#[derive(Clone)]
pub struct SqliteExecutiveStore {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteExecutiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutiveStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteExecutiveStore {
    /// Open (or create) the database at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        tracing::debug!(path = %path.display(), "executive store opened");
        Ok(Self {
            path: path.to_path_buf(),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema version recorded in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn schema_version(&self) -> Result<Option<u32>> {
        let conn = lock(&self.conn)?;
        Ok(read_schema_version(&conn)?)
    }

    /// Executives stored for `company_id`, best-ranked first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored record is corrupt.
    pub fn executives_for(&self, company_id: &str) -> Result<Vec<StoredExecutive>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT rank, record, saved_at FROM executives \
             WHERE company_id = ?1 ORDER BY rank ASC",
        )?;
        let rows = stmt.query_map(params![company_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut stored = Vec::new();
        for row in rows {
            let (rank, record, saved_at) = row?;
            let executive: Executive = serde_json::from_str(&record)
                .map_err(|e| LeadscoutError::Store(format!("corrupt executive record: {e}")))?;
            let saved_at = DateTime::parse_from_rfc3339(&saved_at)
                .map_err(|e| LeadscoutError::Store(format!("corrupt timestamp: {e}")))?
                .with_timezone(&Utc);
            stored.push(StoredExecutive {
                rank: usize::try_from(rank).unwrap_or_default(),
                executive,
                saved_at,
            });
        }
        Ok(stored)
    }

    /// Number of distinct companies with stored executives.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn company_count(&self) -> Result<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT company_id) FROM executives",
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Replace the rows for one company inside a single transaction.
    fn replace_company(
        conn: &Mutex<Connection>,
        company_id: &str,
        executives: &[Executive],
    ) -> Result<()> {
        let mut conn = lock(conn)?;
        let saved_at = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM executives WHERE company_id = ?1",
            params![company_id],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO executives (id, company_id, rank, full_name, title, \
                 seniority_tier, email, phone, linkedin_url, sources, overall_confidence, \
                 data_completeness, discovery_method, record, saved_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )?;
            for (rank, executive) in executives.iter().enumerate() {
                let person = &executive.person;
                let sources: Vec<&str> = person.sources.iter().map(|s| s.name()).collect();
                let sources = serde_json::to_string(&sources)
                    .map_err(|e| LeadscoutError::Store(e.to_string()))?;
                let record = serde_json::to_string(executive)
                    .map_err(|e| LeadscoutError::Store(e.to_string()))?;
                insert.execute(params![
                    uuid::Uuid::new_v4().to_string(),
                    company_id,
                    i64::try_from(rank).unwrap_or(i64::MAX),
                    person.full_name,
                    person.title,
                    person.seniority_tier.name(),
                    person.email,
                    person.phone,
                    person.linkedin_url,
                    sources,
                    executive.overall_confidence,
                    executive.data_completeness_score,
                    executive.discovery_method.name(),
                    record,
                    saved_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[async_trait]
impl ExecutiveStore for SqliteExecutiveStore {
    async fn save_executives(
        &self,
        company_id: &str,
        executives: &[Executive],
    ) -> std::result::Result<(), DiscoveryError> {
        let conn = Arc::clone(&self.conn);
        let company_id = company_id.to_owned();
        let executives = executives.to_vec();
        tokio::task::spawn_blocking(move || {
            Self::replace_company(&conn, &company_id, &executives)
        })
        .await
        .map_err(|e| DiscoveryError::Persistence(format!("store task failed: {e}")))?
        .map_err(|e| DiscoveryError::Persistence(e.to_string()))
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| LeadscoutError::Store("connection lock poisoned".into()))
}
