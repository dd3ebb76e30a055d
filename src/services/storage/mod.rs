//! Durable key/value storage surviving restarts.
//!
//! Plays the role browser local storage plays for a web client: the session
//! guard keeps its token, user and login timestamp here. Batches are applied
//! atomically so the session keys are always written and cleared together.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::services::database::Database;

pub trait DurableStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes every entry or none of them.
    fn set_all(&mut self, entries: &[(&str, String)]) -> Result<()>;

    /// Removes every key or none of them. Missing keys are not an error.
    fn remove_all(&mut self, keys: &[&str]) -> Result<()>;

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.set_all(&[(key, value)])
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.remove_all(&[key])
    }
}

/// SQLite-backed storage using the `local_storage` table.
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    pub fn new(db: Database) -> Result<Self> {
        db.initialize_schema()?;
        log::debug!("Session storage ready at {}", db.path());
        Ok(Self { db })
    }

    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context(format!(
                    "Failed to create storage directory {}",
                    parent.display()
                ))?;
            }
        }

        let path_str = path
            .to_str()
            .context("Storage path is not valid UTF-8")?;
        Self::new(Database::new(path_str)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(Database::new(":memory:")?)
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM local_storage", [], |row| row.get(0))
            .context("Failed to count storage entries")?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl DurableStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .connection()
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .context(format!("Failed to read storage key '{}'", key))
    }

    fn set_all(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let tx = self
            .db
            .connection_mut()
            .transaction()
            .context("Failed to begin storage transaction")?;

        for (key, value) in entries {
            tx.execute(
                "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = CURRENT_TIMESTAMP",
                params![key, value],
            )
            .context(format!("Failed to write storage key '{}'", key))?;
        }

        tx.commit().context("Failed to commit storage write")
    }

    fn remove_all(&mut self, keys: &[&str]) -> Result<()> {
        let tx = self
            .db
            .connection_mut()
            .transaction()
            .context("Failed to begin storage transaction")?;

        for key in keys {
            tx.execute("DELETE FROM local_storage WHERE key = ?1", [key])
                .context(format!("Failed to remove storage key '{}'", key))?;
        }

        tx.commit().context("Failed to commit storage removal")
    }
}
