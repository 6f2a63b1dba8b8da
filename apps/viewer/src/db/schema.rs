//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the local cache database.
pub const SCHEMA: &str = r#"
-- Resolved binders keyed by file content hash
CREATE TABLE IF NOT EXISTS binder_cache (
    file_hash TEXT PRIMARY KEY,
    entries_json TEXT NOT NULL,
    complete INTEGER NOT NULL DEFAULT 0,
    cached_at TEXT NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE INDEX IF NOT EXISTS idx_binder_cache_complete ON binder_cache(complete);
"#;

