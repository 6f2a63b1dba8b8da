//! Repository for the binder cache.

use crate::db::error::DbError;
use crate::db::schema::{SCHEMA, SCHEMA_VERSION};
use binder_core::{BinderCache, CacheError, CardEntry};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

/// One cached binder row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CachedBinder {
    pub file_hash: String,
    pub entries: Vec<CardEntry>,
    pub complete: bool,
    pub cached_at: DateTime<Utc>,
}

/// SQLite implementation of the binder cache.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Fetch a cached row regardless of completeness.
    pub fn get_cached(&self, file_hash: &str) -> Result<Option<CachedBinder>> {
        let row = self
            .conn
            .query_row(
                "SELECT entries_json, complete, cached_at FROM binder_cache WHERE file_hash = ?1",
                params![file_hash],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, bool>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((entries_json, complete, cached_at)) = row else {
            return Ok(None);
        };

        let entries: Vec<CardEntry> = serde_json::from_str(&entries_json)?;
        let cached_at = DateTime::parse_from_rfc3339(&cached_at)
            .map_err(|e| DbError::InvalidData(format!("cached_at: {e}")))?
            .with_timezone(&Utc);

        Ok(Some(CachedBinder {
            file_hash: file_hash.to_string(),
            entries,
            complete,
            cached_at,
        }))
    }

    /// Store entries for a hash. The row starts out incomplete.
    pub fn save_cached(&self, file_hash: &str, entries: &[CardEntry]) -> Result<()> {
        let entries_json = serde_json::to_string(entries)?;
        self.conn.execute(
            "INSERT INTO binder_cache (file_hash, entries_json, complete, cached_at) VALUES (?1, ?2, 0, ?3)
             ON CONFLICT(file_hash) DO UPDATE SET entries_json = excluded.entries_json, complete = 0, cached_at = excluded.cached_at",
            params![file_hash, entries_json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn set_complete(&self, file_hash: &str) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE binder_cache SET complete = 1 WHERE file_hash = ?1",
            params![file_hash],
        )?;
        Ok(updated > 0)
    }

    pub fn count_cached(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM binder_cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl BinderCache for SqliteRepository {
    fn is_complete(&self, file_hash: &str) -> binder_core::Result<bool> {
        let complete: Option<bool> = self
            .conn
            .query_row(
                "SELECT complete FROM binder_cache WHERE file_hash = ?1",
                params![file_hash],
                |row| row.get(0),
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(complete.unwrap_or(false))
    }

    fn try_hydrate(&self, file_hash: &str) -> binder_core::Result<Option<Vec<CardEntry>>> {
        match self.get_cached(file_hash) {
            Ok(Some(cached)) if cached.complete => Ok(Some(cached.entries)),
            Ok(_) => Ok(None),
            Err(DbError::Serialization(e)) => Err(CacheError::Corrupt {
                hash: file_hash.to_string(),
                reason: e.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, file_hash: &str, entries: &[CardEntry]) -> binder_core::Result<()> {
        Ok(self.save_cached(file_hash, entries)?)
    }

    fn mark_complete(&self, file_hash: &str) -> binder_core::Result<()> {
        if !self.set_complete(file_hash)? {
            return Err(CacheError::Storage(format!(
                "no cached entries for {file_hash}"
            )));
        }
        Ok(())
    }
}
