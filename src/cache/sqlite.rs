//! SQLite-backed cache store (default `.parlint` file).

use log::{debug, warn};
use rusqlite::Connection;
use std::path::Path;

use super::{CacheStore, ResultCache};
use crate::Fingerprint;
use crate::error::LintError;

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS fingerprints (
    key TEXT PRIMARY KEY,
    hash BLOB NOT NULL
);
"#;

const INSERT_SQL: &str = "INSERT OR REPLACE INTO fingerprints (key, hash) VALUES (?1, ?2)";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the cache DB and ensure schema + WAL.
    pub fn open(path: &Path) -> Result<Self, LintError> {
        let conn = Connection::open(path)?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        conn.execute_batch(WAL_PRAGMAS)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// In-memory DB with the same schema (tests, throwaway runs).
    pub fn open_in_memory() -> Result<Self, LintError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl CacheStore for SqliteStore {
    fn load(&self) -> Result<ResultCache, LintError> {
        let mut stmt = self.conn.prepare("SELECT key, hash FROM fingerprints")?;
        let rows = stmt.query_map([], |row| {
            let key: String = row.get(0)?;
            let hash: Vec<u8> = row.get(1)?;
            Ok((key, hash))
        })?;
        let mut cache = ResultCache::new();
        for row in rows {
            let (key, hash) = row?;
            match Fingerprint::from_slice(&hash) {
                Some(fp) => {
                    cache.insert(key, fp);
                }
                None => warn!("dropping cache entry {} with {}-byte hash", key, hash.len()),
            }
        }
        Ok(cache)
    }

    fn save(&mut self, cache: &ResultCache) -> Result<(), LintError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM fingerprints", [])?;
        {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            for (key, fp) in cache {
                stmt.execute((key.as_str(), fp.as_bytes().as_slice()))?;
            }
        }
        tx.commit()?;
        debug!("cache saved: {} entries", cache.len());
        Ok(())
    }
}
