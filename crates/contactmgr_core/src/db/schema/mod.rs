//! Contacts schema bootstrap.
//!
//! # Responsibility
//! - Create the `contacts` table on an empty database.
//! - Refuse databases written by a newer schema, or missing expected columns.
//!
//! # Invariants
//! - Bootstrap is idempotent; reopening an initialized database is a no-op.
//! - `PRAGMA user_version` is written in the same transaction as the DDL.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

pub const CONTACTS_TABLE: &str = "contacts";

const CONTACTS_DDL: &str = include_str!("0001_contacts.sql");

const CONTACTS_COLUMNS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "created_at",
];

/// Creates the contacts table when absent and verifies its shape.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current = current_user_version(conn)?;

    if current > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: SCHEMA_VERSION,
        });
    }

    if current < SCHEMA_VERSION {
        let tx = conn.transaction()?;
        tx.execute_batch(CONTACTS_DDL)?;
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
        tx.commit()?;
    }

    verify_contacts_table(conn)
}

fn verify_contacts_table(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([CONTACTS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(DbError::MissingRequiredTable(CONTACTS_TABLE));
    }

    for &required in CONTACTS_COLUMNS {
        if !columns.iter().any(|column| column.as_str() == required) {
            return Err(DbError::MissingRequiredColumn {
                table: CONTACTS_TABLE,
                column: required,
            });
        }
    }

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
