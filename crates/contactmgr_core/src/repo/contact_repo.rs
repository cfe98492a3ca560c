//! Contact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide save/find/list/update/delete over the `contacts` table.
//! - Run each call as exactly one session: open, (begin, execute, commit), close.
//!
//! # Invariants
//! - Write paths call `Contact::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `update`/`delete` on a missing id report `NotFound`, never a silent no-op.
//! - `fetch_all` applies no ordering; callers must not rely on row order.

use crate::db::{DbError, SessionFactory};
use crate::model::contact::{Contact, ContactId, ContactValidationError};
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    email,
    phone,
    created_at
FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactId),
    /// Update or delete was called on a contact that was never saved.
    Unsaved,
    /// Save was called on a contact that already has an id.
    AlreadyPersisted(ContactId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::Unsaved => write!(f, "contact has not been saved yet"),
            Self::AlreadyPersisted(id) => write!(f, "contact already saved with id {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Unsaved | Self::AlreadyPersisted(_) | Self::InvalidData(_) => {
                None
            }
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
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

/// Repository interface for contact CRUD operations.
pub trait ContactRepository {
    /// Inserts an unsaved contact, writes the assigned id back into it and
    /// returns that id.
    fn save(&self, contact: &mut Contact) -> RepoResult<ContactId>;
    /// Returns `Ok(None)` when no row has `id`.
    fn find_by_id(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Returns every stored contact in storage order.
    fn fetch_all(&self) -> RepoResult<Vec<Contact>>;
    /// Overwrites the stored row with the contact's current names, email and phone.
    fn update(&self, contact: &Contact) -> RepoResult<()>;
    /// Removes the stored row identified by the contact's id.
    fn delete(&self, contact: &Contact) -> RepoResult<()>;
}

/// SQLite-backed contact repository.
///
/// Borrows the factory; every call opens and closes its own session.
pub struct SqliteContactRepository<'f> {
    factory: &'f SessionFactory,
}

impl<'f> SqliteContactRepository<'f> {
    pub fn new(factory: &'f SessionFactory) -> Self {
        Self { factory }
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn save(&self, contact: &mut Contact) -> RepoResult<ContactId> {
        if let Some(id) = contact.id() {
            return Err(RepoError::AlreadyPersisted(id));
        }
        contact.validate()?;
        let started_at = Instant::now();

        let mut session = self.factory.open_session()?;
        let tx = session.begin_transaction()?;
        tx.execute(
            "INSERT INTO contacts (
                first_name,
                last_name,
                email,
                phone,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                contact.first_name(),
                contact.last_name(),
                contact.email(),
                contact.phone(),
                contact.created_at(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        // Committed: the id is bound even if close fails below.
        contact.assign_id(id);
        session.close()?;

        debug!(
            "event=contact_save module=repo status=ok id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }

    fn find_by_id(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let session = self.factory.open_session()?;
        let found = select_contact(session.connection(), id)?;
        session.close()?;

        debug!(
            "event=contact_find module=repo status=ok id={id} found={}",
            found.is_some()
        );
        Ok(found)
    }

    fn fetch_all(&self) -> RepoResult<Vec<Contact>> {
        let session = self.factory.open_session()?;
        let contacts = {
            let mut stmt = session
                .connection()
                .prepare(&format!("{CONTACT_SELECT_SQL};"))?;
            let mut rows = stmt.query([])?;
            let mut contacts = Vec::new();
            while let Some(row) = rows.next()? {
                contacts.push(parse_contact_row(row)?);
            }
            contacts
        };
        session.close()?;

        debug!(
            "event=contact_fetch_all module=repo status=ok count={}",
            contacts.len()
        );
        Ok(contacts)
    }

    fn update(&self, contact: &Contact) -> RepoResult<()> {
        let id = contact.id().ok_or(RepoError::Unsaved)?;
        contact.validate()?;

        let mut session = self.factory.open_session()?;
        let tx = session.begin_transaction()?;
        let changed = tx.execute(
            "UPDATE contacts
             SET
                first_name = ?1,
                last_name = ?2,
                email = ?3,
                phone = ?4
             WHERE id = ?5;",
            params![
                contact.first_name(),
                contact.last_name(),
                contact.email(),
                contact.phone(),
                id,
            ],
        )?;
        if changed == 0 {
            drop(tx);
            session.close()?;
            warn!("event=contact_update module=repo status=not_found id={id}");
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;
        session.close()?;

        debug!("event=contact_update module=repo status=ok id={id}");
        Ok(())
    }

    fn delete(&self, contact: &Contact) -> RepoResult<()> {
        let id = contact.id().ok_or(RepoError::Unsaved)?;

        let mut session = self.factory.open_session()?;
        let tx = session.begin_transaction()?;
        let changed = tx.execute("DELETE FROM contacts WHERE id = ?1;", [id])?;
        if changed == 0 {
            drop(tx);
            session.close()?;
            warn!("event=contact_delete module=repo status=not_found id={id}");
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;
        session.close()?;

        debug!("event=contact_delete module=repo status=ok id={id}");
        Ok(())
    }
}

fn select_contact(conn: &Connection, id: ContactId) -> RepoResult<Option<Contact>> {
    let mut stmt = conn.prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_contact_row(row)?));
    }

    Ok(None)
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id: ContactId = row.get("id")?;
    let contact = Contact::from_parts(
        id,
        row.get("first_name")?,
        row.get("last_name")?,
        row.get("email")?,
        row.get("phone")?,
        row.get("created_at")?,
    );
    contact.validate().map_err(|err| {
        RepoError::InvalidData(format!("row {id} in contacts violates invariants: {err}"))
    })?;
    Ok(contact)
}
