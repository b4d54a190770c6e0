//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Persist string values in the `key_value` table.
//! - Refuse connections that did not go through `open_db`.
//!
//! # Invariants
//! - `set` is a single upsert statement, so a value is never half written.

use super::{KeyValueStore, StorageError, StorageResult};
use crate::db::migrations::{current_user_version, latest_version};
use log::error;
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value store over a migrated SQLite connection.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Wraps a connection after checking its schema is ready.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when `key_value` does not exist.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(StorageError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_table: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'key_value'
            );",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Err(StorageError::MissingRequiredTable("key_value"));
        }

        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM key_value WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn
            .execute(
                "INSERT INTO key_value (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )
            .map_err(|err| {
                error!(
                    "event=kv_set module=storage status=error key={} bytes={} error={}",
                    key,
                    value.len(),
                    err
                );
                StorageError::from(err)
            })?;
        Ok(())
    }
}
