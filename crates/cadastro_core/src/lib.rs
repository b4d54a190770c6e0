//! Core domain logic for the cadastro registration app.
//! This crate is the single source of truth for people-record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{
    next_person_id, Person, PersonDraft, PersonField, PersonId, PersonValidationError,
};
pub use repo::people_store::{
    LoadOutcome, PeopleStore, StoreError, StoreResult, MALFORMED_BACKUP_KEY, PEOPLE_KEY,
};
pub use service::form_service::{
    FormError, FormMode, FormSession, PhotoPicker, SaveOutcome, SPLASH_DELAY_MS,
};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
