//! Contact domain model.
//!
//! # Responsibility
//! - Define the single persisted record type of the contact manager.
//! - Provide a builder for fresh, not-yet-persisted contacts.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one, and never changes afterwards.
//! - `first_name` and `last_name` are never empty (after trimming).
//! - `created_at` is set once at build time and never rewritten.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Surrogate key assigned by storage.
///
/// Kept at full SQLite rowid width so no narrowing happens between the
/// database and callers.
pub type ContactId = i64;

/// Validation failures for contact construction and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactValidationError {
    EmptyFirstName,
    EmptyLastName,
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "first_name cannot be empty"),
            Self::EmptyLastName => write!(f, "last_name cannot be empty"),
        }
    }
}

impl Error for ContactValidationError {}

/// One person's contact information.
///
/// Fields are private so that `id` and `created_at` cannot be rewritten by
/// callers; use the setters to prepare update data. Only the builder and the
/// store construct contacts, so there is no `Deserialize` impl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    id: Option<ContactId>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<i64>,
    /// Unix epoch milliseconds.
    created_at: i64,
}

impl Contact {
    pub fn id(&self) -> Option<ContactId> {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<i64> {
        self.phone
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Returns whether the store has assigned an id yet.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn set_first_name(
        &mut self,
        value: impl Into<String>,
    ) -> Result<(), ContactValidationError> {
        self.first_name = require_name(value.into(), ContactValidationError::EmptyFirstName)?;
        Ok(())
    }

    pub fn set_last_name(
        &mut self,
        value: impl Into<String>,
    ) -> Result<(), ContactValidationError> {
        self.last_name = require_name(value.into(), ContactValidationError::EmptyLastName)?;
        Ok(())
    }

    pub fn set_email(&mut self, value: Option<String>) {
        self.email = value;
    }

    pub fn set_phone(&mut self, value: Option<i64>) {
        self.phone = value;
    }

    /// Validates name invariants.
    ///
    /// Needed because row decoding bypasses the builder.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ContactValidationError::EmptyFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(ContactValidationError::EmptyLastName);
        }
        Ok(())
    }

    /// Rebuilds a persisted contact from storage columns.
    pub(crate) fn from_parts(
        id: ContactId,
        first_name: String,
        last_name: String,
        email: Option<String>,
        phone: Option<i64>,
        created_at: i64,
    ) -> Self {
        Self {
            id: Some(id),
            first_name,
            last_name,
            email,
            phone,
            created_at,
        }
    }

    /// Records the id assigned by the store. Only the store calls this, once.
    pub(crate) fn assign_id(&mut self, id: ContactId) {
        debug_assert!(self.id.is_none(), "contact id must be assigned once");
        self.id = Some(id);
    }
}

impl Display for Contact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Contact{{id=")?;
        match self.id {
            Some(id) => write!(f, "{id}")?,
            None => write!(f, "null")?,
        }
        write!(
            f,
            ", firstName='{}', lastName='{}', email=",
            self.first_name, self.last_name
        )?;
        match &self.email {
            Some(email) => write!(f, "'{email}'")?,
            None => write!(f, "null")?,
        }
        write!(f, ", phone=")?;
        match self.phone {
            Some(phone) => write!(f, "{phone}")?,
            None => write!(f, "null")?,
        }
        write!(f, "}}")
    }
}

/// Incremental builder for a new, unsaved contact.
#[derive(Debug, Clone)]
pub struct ContactBuilder {
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<i64>,
}

impl ContactBuilder {
    /// Seeds a builder with the two required names.
    ///
    /// # Errors
    /// - Returns a validation error when either name is empty or whitespace.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<Self, ContactValidationError> {
        Ok(Self {
            first_name: require_name(first_name.into(), ContactValidationError::EmptyFirstName)?,
            last_name: require_name(last_name.into(), ContactValidationError::EmptyLastName)?,
            email: None,
            phone: None,
        })
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: i64) -> Self {
        self.phone = Some(phone);
        self
    }

    /// Finalizes an unsaved contact stamped with the current time.
    pub fn build(self) -> Contact {
        Contact {
            id: None,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            created_at: now_epoch_ms(),
        }
    }
}

fn require_name(
    value: String,
    on_empty: ContactValidationError,
) -> Result<String, ContactValidationError> {
    if value.trim().is_empty() {
        return Err(on_empty);
    }
    Ok(value)
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
