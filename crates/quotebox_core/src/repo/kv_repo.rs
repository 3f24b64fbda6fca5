//! Key/value repository contracts with SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Provide `get/set/remove` over string keys for store and service layers.
//! - `SqliteKvRepository` is the durable backend.
//! - `MemoryKvRepository` backs session-scoped state and test doubles.
//!
//! # Invariants
//! - `set` replaces any previous value for the key.
//! - `remove` of a missing key is not an error.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for key/value storage.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Backend refused the write (quota exceeded or similar).
    WriteRejected(String),
    /// Backend could not serve the read.
    ReadRejected(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WriteRejected(key) => write!(f, "storage rejected write for key `{key}`"),
            Self::ReadRejected(key) => write!(f, "storage rejected read for key `{key}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::WriteRejected(_) | Self::ReadRejected(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for string key/value storage.
pub trait KvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&self, key: &str) -> RepoResult<()>;
}

impl<R: KvRepository + ?Sized> KvRepository for &R {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        (**self).remove(key)
    }
}

/// SQLite-backed durable key/value repository.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// Process-lifetime key/value repository.
///
/// Counts successful writes so callers can assert persistence behavior, and
/// can be switched to reject writes or reads to simulate a failing backend.
#[derive(Debug, Default)]
pub struct MemoryKvRepository {
    entries: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
    reject_writes: Cell<bool>,
    reject_reads: Cell<bool>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set`/`remove` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Makes every following write fail with `RepoError::WriteRejected`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Makes every following `get` fail with `RepoError::ReadRejected`.
    pub fn set_reject_reads(&self, reject: bool) {
        self.reject_reads.set(reject);
    }

    /// Stores a raw value without counting it as a write.
    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn check_writable(&self, key: &str) -> RepoResult<()> {
        if self.reject_writes.get() {
            return Err(RepoError::WriteRejected(key.to_string()));
        }
        Ok(())
    }
}

impl KvRepository for MemoryKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        if self.reject_reads.get() {
            return Err(RepoError::ReadRejected(key.to_string()));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.check_writable(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.check_writable(key)?;
        self.entries.borrow_mut().remove(key);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KvRepository, MemoryKvRepository, RepoError, SqliteKvRepository};
    use crate::db::open_db_in_memory;

    #[test]
    fn sqlite_set_replaces_previous_value() {
        let conn = open_db_in_memory().expect("in-memory db");
        let repo = SqliteKvRepository::new(&conn);

        assert_eq!(repo.get("quotes").expect("get"), None);
        repo.set("quotes", "[]").expect("first set");
        repo.set("quotes", "[1]").expect("second set");
        assert_eq!(repo.get("quotes").expect("get").as_deref(), Some("[1]"));

        repo.remove("quotes").expect("remove");
        repo.remove("quotes").expect("removing a missing key is fine");
        assert_eq!(repo.get("quotes").expect("get"), None);
    }

    #[test]
    fn memory_repo_counts_writes_and_can_reject_them() {
        let repo = MemoryKvRepository::new();
        repo.seed("lastCategoryFilter", "all");
        assert_eq!(repo.write_count(), 0);

        repo.set("lastCategoryFilter", "Life").expect("set");
        assert_eq!(repo.write_count(), 1);

        repo.set_reject_writes(true);
        let err = repo.set("lastCategoryFilter", "Dreams").unwrap_err();
        assert!(matches!(err, RepoError::WriteRejected(key) if key == "lastCategoryFilter"));
        assert_eq!(
            repo.get("lastCategoryFilter").expect("get").as_deref(),
            Some("Life")
        );
        assert_eq!(repo.write_count(), 1);
    }

    #[test]
    fn memory_repo_can_reject_reads() {
        let repo = MemoryKvRepository::new();
        repo.seed("quotes", "[]");
        repo.set_reject_reads(true);
        assert!(matches!(
            repo.get("quotes"),
            Err(RepoError::ReadRejected(key)) if key == "quotes"
        ));

        repo.set_reject_reads(false);
        assert_eq!(repo.get("quotes").expect("get").as_deref(), Some("[]"));
    }
}
