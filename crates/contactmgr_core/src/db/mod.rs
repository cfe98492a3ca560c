//! SQLite storage bootstrap and session lifecycle.
//!
//! # Responsibility
//! - Build the process-wide `SessionFactory` from a file path or in memory.
//! - Hand out one short-lived `Session` per unit of work.
//! - Create the `contacts` table when missing and guard its version.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No session is handed out before the schema is in place.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod schema;
mod session;

pub use session::{Session, SessionFactory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// An empty path would give every session its own temporary database.
    EmptyDatabasePath,
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::EmptyDatabasePath => write!(f, "database path cannot be empty"),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::EmptyDatabasePath
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
