//! Session factory and per-operation sessions.
//!
//! # Responsibility
//! - Own the database location for the lifetime of the process.
//! - Open one configured connection per unit of work.
//! - Keep shared in-memory databases alive between sessions.
//!
//! # Invariants
//! - Every session has `foreign_keys=ON` and a 5s busy timeout.
//! - The factory bootstraps the schema before its first session is handed out.

use super::schema::ensure_schema;
use super::{DbError, DbResult};
use crate::config::AppConfig;
use log::{debug, error, info};
use rusqlite::{Connection, OpenFlags, Transaction};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    SharedMemory(String),
}

impl Location {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::SharedMemory(_) => "memory",
        }
    }
}

/// Process-wide handle that opens sessions against one database.
///
/// Built once at startup and passed by reference to the store. Release it
/// with [`SessionFactory::close`] at shutdown.
#[derive(Debug)]
pub struct SessionFactory {
    location: Location,
    // Idle connection that pins a shared in-memory database; SQLite discards
    // the database when its last connection closes.
    anchor: Option<Connection>,
}

impl SessionFactory {
    /// Opens (creating when needed) a file-backed database.
    ///
    /// `:memory:` is routed to [`SessionFactory::open_in_memory`], since a
    /// plain SQLite memory path is private to each connection.
    ///
    /// # Errors
    /// - Returns `DbError::EmptyDatabasePath` for an empty path, which SQLite
    ///   would otherwise open as a per-connection temporary database.
    ///
    /// # Side effects
    /// - Creates the `contacts` table on first use.
    /// - Emits `session_factory_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            error!("event=session_factory_open module=db status=error error_code=db_path_empty");
            return Err(DbError::EmptyDatabasePath);
        }
        if path.as_os_str() == MEMORY_PATH {
            return Self::open_in_memory();
        }
        Self::build(Location::File(path.to_path_buf()))
    }

    /// Opens a private in-memory database shared by this factory's sessions.
    ///
    /// Each call yields an independent database.
    pub fn open_in_memory() -> DbResult<Self> {
        let uri = format!("file:contactmgr-{}?mode=memory&cache=shared", Uuid::new_v4());
        Self::build(Location::SharedMemory(uri))
    }

    /// Opens the database named by `config.db_path`, or an in-memory one.
    pub fn from_config(config: &AppConfig) -> DbResult<Self> {
        match config.db_path.as_deref() {
            Some(path) => Self::open(path),
            None => Self::open_in_memory(),
        }
    }

    /// Opens a new session for one unit of work.
    pub fn open_session(&self) -> DbResult<Session> {
        let conn = connect(&self.location)?;
        debug!(
            "event=session_open module=db status=ok mode={}",
            self.location.mode()
        );
        Ok(Session {
            conn,
            opened_at: Instant::now(),
        })
    }

    /// Releases the factory and, for in-memory databases, all stored data.
    pub fn close(mut self) -> DbResult<()> {
        if let Some(anchor) = self.anchor.take() {
            anchor.close().map_err(|(_, err)| err)?;
        }
        info!(
            "event=session_factory_close module=db status=ok mode={}",
            self.location.mode()
        );
        Ok(())
    }

    fn build(location: Location) -> DbResult<Self> {
        let started_at = Instant::now();
        let mode = location.mode();
        info!("event=session_factory_open module=db status=start mode={mode}");

        let mut conn = match connect(&location) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=session_factory_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        if let Err(err) = ensure_schema(&mut conn) {
            error!(
                "event=session_factory_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        let anchor = match location {
            Location::SharedMemory(_) => Some(conn),
            Location::File(_) => {
                drop(conn);
                None
            }
        };

        info!(
            "event=session_factory_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(Self { location, anchor })
    }
}

/// Scoped connection bounded by explicit open and close.
pub struct Session {
    conn: Connection,
    opened_at: Instant,
}

impl Session {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begins a deferred transaction. Dropping it without commit rolls back.
    pub fn begin_transaction(&mut self) -> DbResult<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Closes the underlying connection, surfacing close errors.
    pub fn close(self) -> DbResult<()> {
        let elapsed = self.opened_at.elapsed();
        self.conn.close().map_err(|(_, err)| err)?;
        debug!(
            "event=session_close module=db status=ok duration_ms={}",
            elapsed.as_millis()
        );
        Ok(())
    }
}

fn connect(location: &Location) -> DbResult<Connection> {
    let conn = match location {
        Location::File(path) => Connection::open(path)?,
        Location::SharedMemory(uri) => Connection::open_with_flags(
            uri,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?,
    };
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}
