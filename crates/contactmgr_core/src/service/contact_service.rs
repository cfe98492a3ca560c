//! Contact use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::contact::{Contact, ContactBuilder, ContactId};
use crate::repo::contact_repo::{ContactRepository, RepoError, RepoResult};

/// Use-case service wrapper for contact CRUD operations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Saves an unsaved contact and returns its assigned id.
    pub fn save(&self, contact: &mut Contact) -> RepoResult<ContactId> {
        self.repo.save(contact)
    }

    /// Builds and saves a contact in one step.
    ///
    /// Returns the persisted contact with its id populated.
    pub fn create(&self, builder: ContactBuilder) -> RepoResult<Contact> {
        let mut contact = builder.build();
        self.repo.save(&mut contact)?;
        Ok(contact)
    }

    pub fn find_by_id(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        self.repo.find_by_id(id)
    }

    pub fn fetch_all(&self) -> RepoResult<Vec<Contact>> {
        self.repo.fetch_all()
    }

    /// Pushes the full in-memory state of a saved contact to storage.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update(&self, contact: &Contact) -> RepoResult<()> {
        self.repo.update(contact)
    }

    pub fn delete(&self, contact: &Contact) -> RepoResult<()> {
        self.repo.delete(contact)
    }

    /// Looks up a contact by id and deletes it.
    ///
    /// # Contract
    /// - Returns `RepoError::NotFound(id)` when no such contact exists.
    /// - Returns the removed contact on success.
    pub fn delete_by_id(&self, id: ContactId) -> RepoResult<Contact> {
        let contact = self.repo.find_by_id(id)?.ok_or(RepoError::NotFound(id))?;
        self.repo.delete(&contact)?;
        Ok(contact)
    }
}
