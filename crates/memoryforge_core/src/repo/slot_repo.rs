//! Named slot storage contracts and implementations.
//!
//! # Responsibility
//! - Provide the `get_item`/`set_item` capability pair the entry store
//!   mirrors its collection into.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `get_item` returns `Ok(None)` for a slot that was never written.
//! - `set_item` replaces the whole value of a slot in one statement; a
//!   reader never observes a partially written value.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SlotResult<T> = Result<T, SlotError>;

/// Failure reading or writing a slot.
#[derive(Debug)]
pub enum SlotError {
    InvalidKey(String),
    Db(DbError),
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid slot key: `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<DbError> for SlotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key/value persistence capability used by the entry store.
pub trait SlotRepository {
    fn get_item(&self, key: &str) -> SlotResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> SlotResult<()>;
}

impl<R: SlotRepository + ?Sized> SlotRepository for &mut R {
    fn get_item(&self, key: &str) -> SlotResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> SlotResult<()> {
        (**self).set_item(key, value)
    }
}

/// SQLite-backed slot repository over a migrated connection.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn get_item(&self, key: &str) -> SlotResult<Option<String>> {
        let key = normalize_key(key)?;
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_item(&mut self, key: &str, value: &str) -> SlotResult<()> {
        let key = normalize_key(key)?;
        self.conn.execute(
            "INSERT INTO slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        debug!(
            "event=slot_write module=repo status=ok backend=sqlite bytes={}",
            value.len()
        );
        Ok(())
    }
}

/// Process-local slot repository. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemorySlotRepository {
    slots: HashMap<String, String>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a slot directly, bypassing key validation. Used to stage
    /// pre-existing or corrupted mirrors.
    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(key.into(), value.into());
        self
    }
}

impl SlotRepository for MemorySlotRepository {
    fn get_item(&self, key: &str) -> SlotResult<Option<String>> {
        let key = normalize_key(key)?;
        Ok(self.slots.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> SlotResult<()> {
        let key = normalize_key(key)?;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn normalize_key(key: &str) -> SlotResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(SlotError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}
