//! Durable executive storage.
//!
//! [`SqliteExecutiveStore`] keeps the latest discovery results per company in
//! a single SQLite file and implements the engine's write-back contract.

mod schema;
mod sqlite;

pub use schema::CURRENT_SCHEMA_VERSION;
pub use sqlite::{SqliteExecutiveStore, StoredExecutive};
