//! SQLite-backed travel repository.
//!
//! # Responsibility
//! - Hold the borrowed connection shared by project and place queries.
//! - Provide the transaction boundary used by the rules engines.
//!
//! # Invariants
//! - Only connections migrated to the latest schema are accepted.
//! - Units of work use `BEGIN IMMEDIATE`, so check-then-write sequences are
//!   not interleaved with other writers.

use crate::db::migrations::latest_version;
use crate::repo::{RepoError, RepoResult, TravelRepository};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Travel repository over one migrated SQLite connection.
#[derive(Clone, Copy)]
pub struct SqliteTravelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTravelRepository<'conn> {
    /// Creates a repository from a connection opened via `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }
}

impl TravelRepository for SqliteTravelRepository<'_> {
    fn atomically<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        if !self.conn.is_autocommit() {
            return op(self);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        // Dropping `tx` on the error path rolls the unit back.
        let value = op(self)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
