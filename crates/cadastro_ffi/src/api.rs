//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the registration screen's store operations to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` and a message.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the database, loads the store, and runs one operation,
//!   so the persisted list is the only state shared between calls.

use cadastro_core::db::open_db;
use cadastro_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    FormError, LoadOutcome, PeopleStore, Person, PersonDraft, PersonId, SqliteKeyValueStore, StoreError,
    SPLASH_DELAY_MS,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

const PEOPLE_DB_FILE_NAME: &str = "cadastro_people.sqlite3";
const PEOPLE_DB_PATH_ENV: &str = "CADASTRO_DB_PATH";
static PEOPLE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Milliseconds the splash screen waits before opening the form.
#[flutter_rust_bridge::frb(sync)]
pub fn splash_delay_ms() -> u64 {
    SPLASH_DELAY_MS
}

/// One row of the registered-people list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonItem {
    pub id: i64,
    pub photo: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleListResponse {
    /// People in stored order (empty on failure).
    pub items: Vec<PersonItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope for save/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected person ID on success.
    pub person_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl PeopleActionResponse {
    fn success(message: impl Into<String>, person_id: PersonId) -> Self {
        Self {
            ok: true,
            person_id: Some(person_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            person_id: None,
            message: message.into(),
        }
    }
}

/// Lists registered people.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - A malformed stored list yields an empty list with a recovery message.
#[flutter_rust_bridge::frb(sync)]
pub fn people_list() -> PeopleListResponse {
    let result = with_people_store(|store| {
        Ok(store.list().iter().map(to_person_item).collect::<Vec<_>>())
    });
    match result {
        Ok(items) => {
            let message = if items.is_empty() {
                "Nenhuma pessoa cadastrada".to_string()
            } else {
                format!("Found {} person(s).", items.len())
            };
            PeopleListResponse { items, message }
        }
        Err(err) => PeopleListResponse {
            items: Vec::new(),
            message: format!("people_list failed: {err}"),
        },
    }
}

/// Creates (`id = None`) or updates (`id = Some`) one person.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Rejects drafts with a missing photo or empty field.
/// - Returns the created or updated person ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn people_save(
    id: Option<i64>,
    photo: String,
    name: String,
    address: String,
    city: String,
    state: String,
    phone: String,
) -> PeopleActionResponse {
    let draft = PersonDraft {
        photo,
        name,
        address,
        city,
        state,
        phone,
    };

    let result = with_people_store(|store| match id {
        Some(id) => store.update(id, draft).map(|_| Ok(id)),
        None => store.create(draft).map(created_person_id),
    });

    match (result, id) {
        (Ok(Ok(person_id)), Some(_)) => {
            PeopleActionResponse::success("Person updated.", person_id)
        }
        (Ok(Ok(person_id)), None) => PeopleActionResponse::success("Person created.", person_id),
        (Ok(Err(err)), _) => PeopleActionResponse::failure(format!("people_save failed: {err}")),
        (Err(err), _) => PeopleActionResponse::failure(format!("people_save failed: {err}")),
    }
}

/// Reads the id of the person `create` just appended.
fn created_person_id(people: &[Person]) -> Result<PersonId, FormError> {
    people
        .last()
        .map(|person| person.id)
        .ok_or(FormError::InconsistentState(
            "created person missing from list",
        ))
}

/// Deletes one person. Unknown IDs succeed without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn people_delete(id: i64) -> PeopleActionResponse {
    match with_people_store(|store| store.delete(id).map(|_| id)) {
        Ok(person_id) => PeopleActionResponse::success("Person deleted.", person_id),
        Err(err) => PeopleActionResponse::failure(format!("people_delete failed: {err}")),
    }
}

fn resolve_people_db_path() -> PathBuf {
    PEOPLE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(PEOPLE_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(PEOPLE_DB_FILE_NAME)
        })
        .clone()
}

fn with_people_store<T>(
    f: impl FnOnce(&mut PeopleStore<SqliteKeyValueStore<'_>>) -> Result<T, StoreError>,
) -> Result<T, String> {
    let db_path = resolve_people_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("people DB open failed: {err}"))?;
    let kv = SqliteKeyValueStore::try_new(&conn)
        .map_err(|err| format!("people storage init failed: {err}"))?;
    let mut store = PeopleStore::new(kv);
    let outcome = store
        .load()
        .map_err(|err| format!("people load failed: {err}"))?;
    if matches!(outcome, LoadOutcome::Recovered { .. }) {
        warn!("event=people_load module=ffi status=recovered");
    }
    f(&mut store).map_err(|err| err.to_string())
}

fn to_person_item(person: &Person) -> PersonItem {
    PersonItem {
        id: person.id,
        photo: person.photo.clone(),
        name: person.name.clone(),
        address: person.address.clone(),
        city: person.city.clone(),
        state: person.state.clone(),
        phone: person.phone.clone(),
    }
}
