//! SQLite DDL for the executive database.

use rusqlite::{Connection, OptionalExtension};

/// Schema version written to `schema_meta` on first open.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Complete DDL. Every statement is `IF NOT EXISTS`, so applying it twice is a no-op.
pub(crate) const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- One row per ranked executive; a company's rows are replaced as a unit.
CREATE TABLE IF NOT EXISTS executives (
    id                     TEXT PRIMARY KEY,
    company_id             TEXT NOT NULL,
    rank                   INTEGER NOT NULL,
    full_name              TEXT NOT NULL,
    title                  TEXT NOT NULL,
    seniority_tier         TEXT NOT NULL,
    email                  TEXT,
    phone                  TEXT,
    linkedin_url           TEXT,
    sources                TEXT NOT NULL DEFAULT '[]',  -- JSON array of source names
    overall_confidence     REAL NOT NULL,
    data_completeness      REAL NOT NULL,
    discovery_method       TEXT NOT NULL,
    record                 TEXT NOT NULL,               -- full Executive as JSON
    saved_at               TEXT NOT NULL                -- RFC 3339
);

CREATE INDEX IF NOT EXISTS idx_executives_company ON executives(company_id, rank);
"#;

/// Apply the schema and seed the version stamp.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

/// Read the stored schema version, if any.
pub(crate) fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.and_then(|v| v.parse().ok()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn schema_applies_twice() {
        let conn = Connection::open_in_memory().expect("open");
        apply_schema(&conn).expect("first");
        apply_schema(&conn).expect("second");
        assert_eq!(
            read_schema_version(&conn).expect("version"),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }

    #[test]
    fn fresh_database_has_no_version() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(
            "CREATE TABLE schema_meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
        )
        .expect("create");
        assert_eq!(read_schema_version(&conn).expect("version"), None);
    }
}
