//! Durable, transactional storage for extraction and resolution tables
//! (spec §4.2).

pub mod batch_api;
pub mod extraction;
mod read;
mod resolution;
pub mod schema;

pub use batch_api::Inserter;

use rusqlite::Connection;

use crate::error::StoreResult;

/// SQLite-backed store. Single-file embedded database with WAL mode for
/// concurrent readers (spec §6.3).
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    /// Open or create a store at `path`.
    pub fn open(path: &std::path::Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                crate::error::StoreError::Internal(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store, for tests and ephemeral use.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    pub fn schema_version(&self) -> StoreResult<u32> {
        let version: String = self.conn.query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        version
            .parse()
            .map_err(|e| crate::error::StoreError::Internal(format!("invalid schema version: {e}")))
    }

    pub fn get_metadata(&self, key: &str) -> Option<String> {
        self.conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .ok()
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO metadata (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    /// The scripts/ruleset hash stored from the last successful resolve
    /// (spec §6.3).
    pub fn scripts_hash(&self) -> Option<String> {
        self.get_metadata("scripts_hash")
    }

    pub fn set_scripts_hash(&self, hash: &str) -> StoreResult<()> {
        self.set_metadata("scripts_hash", hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_in_memory_and_migrates() {
        let store = Store::in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION);
    }

    #[test]
    fn metadata_roundtrip() {
        let store = Store::in_memory().unwrap();
        assert!(store.get_metadata("scripts_hash").is_none());
        store.set_scripts_hash("abc123").unwrap();
        assert_eq!(store.scripts_hash(), Some("abc123".to_string()));
        store.set_scripts_hash("def456").unwrap();
        assert_eq!(store.scripts_hash(), Some("def456".to_string()));
    }
}
