//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the contact store contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Unsaved`) in
//!   addition to DB transport errors.

pub mod contact_repo;
