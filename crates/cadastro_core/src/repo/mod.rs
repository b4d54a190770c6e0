//! Record Store layer.
//!
//! # Responsibility
//! - Own the authoritative people collection.
//! - Mirror every accepted mutation into key-value storage.
//!
//! # Invariants
//! - Writes run `PersonDraft::validate()` before touching storage.
//! - In-memory state advances only after the storage write succeeded.

pub mod people_store;
