//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define storage contracts for projects and places.
//! - Isolate SQLite query details from the rules engines.
//!
//! # Invariants
//! - `get_*` lookups return `Ok(None)` for absent rows instead of failing.
//! - Writes that target a missing row return `RepoError::NotFound`.
//! - Work passed to `TravelRepository::atomically` commits as one unit or
//!   not at all.

use crate::db::DbError;
use crate::model::project::ModelValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod place_repo;
pub mod project_repo;
pub mod sqlite;

pub use place_repo::PlaceRepository;
pub use project_repo::ProjectRepository;
pub use sqlite::SqliteTravelRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project and place persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    /// Write targeted a row that does not exist.
    NotFound(Uuid),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "travel repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted travel data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
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

/// Storage used by the rules engines: both entity repositories plus a unit of
/// work boundary.
pub trait TravelRepository: ProjectRepository + PlaceRepository {
    /// Runs `op` inside one atomic unit of work.
    ///
    /// Commits when `op` returns `Ok`, rolls back when it returns `Err`.
    /// Calling this from inside another `atomically` joins the outer unit.
    fn atomically<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
}
