//! Domain model for the people registration form.
//!
//! # Responsibility
//! - Define the canonical person record and its in-progress draft shape.
//! - Own required-field validation shared by the store and the form.
//!
//! # Invariants
//! - Every stored person is identified by a `PersonId` unique in its collection.
//! - A draft that fails `PersonDraft::validate()` is never persisted.

pub mod person;
