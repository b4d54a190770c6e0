//! People Record Store over a key-value backend.
//!
//! # Responsibility
//! - Load the `people` blob on start and recover from malformed contents.
//! - Provide create/update/delete/list over the in-memory collection.
//! - Persist the full collection after every mutation.
//!
//! # Invariants
//! - Ids are unique within the collection.
//! - Persist first: the next collection is written before it replaces the
//!   in-memory one, so memory and storage never diverge after a failed write.
//! - Mutations are rejected until `load()` ran, so a fresh store can never
//!   overwrite data it has not read yet.
//! - Order is append order; updates keep position, deletes just remove.

use crate::model::person::{next_person_id, Person, PersonDraft, PersonId, PersonValidationError};
use crate::storage::{KeyValueStore, StorageError};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage key holding the JSON-encoded people list.
pub const PEOPLE_KEY: &str = "people";
/// Storage key receiving an unparsable `people` blob before it is discarded.
pub const MALFORMED_BACKUP_KEY: &str = "people.malformed";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by Record Store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Draft is missing the photo or a required field.
    Validation(PersonValidationError),
    /// Storage read or write failed; in-memory state is unchanged.
    Storage(StorageError),
    /// Collection could not be encoded as JSON.
    Encode(serde_json::Error),
    /// A mutation was attempted before `load()`.
    NotLoaded,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "failed to persist people: {err}"),
            Self::Encode(err) => write!(f, "failed to encode people: {err}"),
            Self::NotLoaded => write!(f, "people store must be loaded before it is modified"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::NotLoaded => None,
        }
    }
}

impl From<PersonValidationError> for StoreError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Result of reading the persisted collection on start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Empty,
    /// Stored collection parsed successfully.
    Loaded { count: usize },
    /// Stored blob was malformed and the collection starts empty.
    ///
    /// `backup_key` is `Some` when the raw blob was preserved.
    Recovered { backup_key: Option<&'static str> },
}

/// Authoritative people collection mirrored into key-value storage.
pub struct PeopleStore<S: KeyValueStore> {
    storage: S,
    people: Vec<Person>,
    loaded: bool,
    clock: fn() -> i64,
}

impl<S: KeyValueStore> PeopleStore<S> {
    /// Creates an unloaded store using the system clock for ids.
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, system_epoch_ms)
    }

    /// Creates an unloaded store with a custom epoch-millisecond clock.
    pub fn with_clock(storage: S, clock: fn() -> i64) -> Self {
        Self {
            storage,
            people: Vec::new(),
            loaded: false,
            clock,
        }
    }

    /// Reads the persisted collection into memory.
    ///
    /// A malformed blob is not an error: it is copied to
    /// `MALFORMED_BACKUP_KEY`, logged and replaced by an empty collection.
    ///
    /// # Errors
    /// - `Storage` when the backend read fails. The store stays unloaded.
    pub fn load(&mut self) -> StoreResult<LoadOutcome> {
        let raw = match self.storage.get(PEOPLE_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=people_load module=repo status=error error_code=storage_read_failed error={}",
                    err
                );
                return Err(err.into());
            }
        };

        let outcome = match raw {
            None => {
                self.people.clear();
                LoadOutcome::Empty
            }
            // An empty value carries no records.
            Some(raw) if raw.trim().is_empty() => {
                self.people.clear();
                LoadOutcome::Empty
            }
            Some(raw) => match decode_people(&raw) {
                Ok(people) => {
                    let count = people.len();
                    self.people = people;
                    LoadOutcome::Loaded { count }
                }
                Err(reason) => {
                    warn!(
                        "event=people_load module=repo status=recovered error_code=malformed_state bytes={} reason={}",
                        raw.len(),
                        reason
                    );
                    self.people.clear();
                    LoadOutcome::Recovered {
                        backup_key: self.backup_malformed(&raw),
                    }
                }
            },
        };

        self.loaded = true;
        info!(
            "event=people_load module=repo status=ok count={}",
            self.people.len()
        );
        Ok(outcome)
    }

    /// Returns the collection in stored order.
    pub fn list(&self) -> &[Person] {
        &self.people
    }

    /// Finds one person by id.
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.people.iter().find(|person| person.id == id)
    }

    /// Whether `load()` has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Borrows the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Appends a new person built from `draft` and persists the collection.
    ///
    /// The new person is the last element of the returned slice.
    pub fn create(&mut self, draft: PersonDraft) -> StoreResult<&[Person]> {
        self.ensure_loaded()?;
        draft.validate()?;

        let id = next_person_id(&self.people, (self.clock)());
        let mut next = self.people.clone();
        next.push(Person::from_draft(id, draft));

        self.commit(next, "create")?;
        Ok(&self.people)
    }

    /// Replaces the fields of person `id` in place and persists.
    ///
    /// An unknown `id` leaves the collection unchanged but it is still
    /// written back.
    pub fn update(&mut self, id: PersonId, draft: PersonDraft) -> StoreResult<&[Person]> {
        self.ensure_loaded()?;
        draft.validate()?;

        let mut next = self.people.clone();
        match next.iter_mut().find(|person| person.id == id) {
            Some(slot) => *slot = Person::from_draft(id, draft),
            None => warn!(
                "event=people_update module=repo status=skipped reason=unknown_id person_id={}",
                id
            ),
        }

        self.commit(next, "update")?;
        Ok(&self.people)
    }

    /// Removes person `id` if present and persists. Unknown ids are not an error.
    pub fn delete(&mut self, id: PersonId) -> StoreResult<&[Person]> {
        self.ensure_loaded()?;

        let next = self
            .people
            .iter()
            .filter(|person| person.id != id)
            .cloned()
            .collect::<Vec<_>>();

        self.commit(next, "delete")?;
        Ok(&self.people)
    }

    fn ensure_loaded(&self) -> StoreResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(StoreError::NotLoaded)
        }
    }

    fn commit(&mut self, next: Vec<Person>, op: &'static str) -> StoreResult<()> {
        let encoded = serde_json::to_string(&next).map_err(StoreError::Encode)?;

        if let Err(err) = self.storage.set(PEOPLE_KEY, &encoded) {
            error!(
                "event=people_commit module=repo status=error op={} count={} error_code=storage_write_failed error={}",
                op,
                next.len(),
                err
            );
            return Err(err.into());
        }

        self.people = next;
        info!(
            "event=people_commit module=repo status=ok op={} count={}",
            op,
            self.people.len()
        );
        Ok(())
    }

    fn backup_malformed(&self, raw: &str) -> Option<&'static str> {
        match self.storage.set(MALFORMED_BACKUP_KEY, raw) {
            Ok(()) => Some(MALFORMED_BACKUP_KEY),
            Err(err) => {
                warn!(
                    "event=people_backup module=repo status=error error_code=backup_write_failed error={}",
                    err
                );
                None
            }
        }
    }
}

fn decode_people(raw: &str) -> Result<Vec<Person>, String> {
    let people: Vec<Person> = serde_json::from_str(raw).map_err(|err| err.to_string())?;

    let mut seen = HashSet::with_capacity(people.len());
    for person in &people {
        if !seen.insert(person.id) {
            return Err(format!("duplicate person id {}", person.id));
        }
    }

    Ok(people)
}

fn system_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
