//! Domain model for the contact manager.
//!
//! # Responsibility
//! - Define the in-memory shape mapped one-to-one onto a `contacts` row.
//!
//! # Invariants
//! - Contacts are identified by a storage-assigned `ContactId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod contact;
