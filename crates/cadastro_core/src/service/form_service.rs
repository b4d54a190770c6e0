//! Registration form session.
//!
//! # Responsibility
//! - Hold the draft buffer and the optional edit target of the form screen.
//! - Validate at the boundary, then route saves to create or update.
//! - Expose the read-only people projection the list renders.
//!
//! # Invariants
//! - The draft is only cleared after the store acknowledged the write.
//! - Deleting the record under edit also leaves edit mode.

use crate::model::person::{Person, PersonDraft, PersonField, PersonId, PersonValidationError};
use crate::repo::people_store::{LoadOutcome, PeopleStore, StoreError};
use crate::storage::KeyValueStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Time the splash screen stays up before the form opens.
pub const SPLASH_DELAY_MS: u64 = 5_000;

const SUBMIT_LABEL_CREATE: &str = "Salvar";
const SUBMIT_LABEL_EDIT: &str = "Atualizar";

/// Image selection capability provided by the host platform.
pub trait PhotoPicker {
    /// Returns an opaque photo reference, or `None` when the user cancelled.
    fn pick(&mut self) -> Option<String>;
}

/// Whether saving creates a new person or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(PersonId),
}

/// Result of a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(PersonId),
    Updated(PersonId),
}

/// Form-level errors shown to the user.
#[derive(Debug)]
pub enum FormError {
    /// Blocking message: fill every field and pick a photo.
    Validation(PersonValidationError),
    /// Edit was requested for an id that is not stored.
    UnknownPerson(PersonId),
    Store(StoreError),
    /// Store accepted a write but the read-back did not match.
    InconsistentState(&'static str),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownPerson(id) => write!(f, "person not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent form state: {details}"),
        }
    }
}

impl Error for FormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for FormError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for FormError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// State of the registration screen bound to a Record Store.
pub struct FormSession<S: KeyValueStore> {
    store: PeopleStore<S>,
    draft: PersonDraft,
    editing: Option<PersonId>,
}

impl<S: KeyValueStore> FormSession<S> {
    /// Loads the store and returns a session with an empty draft.
    ///
    /// # Errors
    /// - `Store` when the persisted collection cannot be read.
    pub fn open(mut store: PeopleStore<S>) -> Result<(Self, LoadOutcome), FormError> {
        let outcome = store.load()?;
        let session = Self {
            store,
            draft: PersonDraft::default(),
            editing: None,
        };
        Ok((session, outcome))
    }

    /// People currently stored, in display order.
    pub fn people(&self) -> &[Person] {
        self.store.list()
    }

    pub fn draft(&self) -> &PersonDraft {
        &self.draft
    }

    pub fn mode(&self) -> FormMode {
        match self.editing {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        }
    }

    /// Label of the submit button for the current mode.
    pub fn submit_label(&self) -> &'static str {
        match self.mode() {
            FormMode::Create => SUBMIT_LABEL_CREATE,
            FormMode::Edit(_) => SUBMIT_LABEL_EDIT,
        }
    }

    pub fn set_field(&mut self, field: PersonField, value: impl Into<String>) {
        self.draft.set_field(field, value);
    }

    /// Current photo reference, `None` when no photo is selected.
    pub fn photo(&self) -> Option<&str> {
        if self.draft.photo.is_empty() {
            None
        } else {
            Some(self.draft.photo.as_str())
        }
    }

    pub fn set_photo(&mut self, photo: Option<String>) {
        self.draft.photo = photo.unwrap_or_default();
    }

    /// Asks the picker for a photo. A cancelled pick keeps the current one.
    ///
    /// Returns whether the photo changed.
    pub fn pick_photo(&mut self, picker: &mut dyn PhotoPicker) -> bool {
        match picker.pick() {
            Some(reference) if !reference.is_empty() => {
                self.draft.photo = reference;
                true
            }
            _ => false,
        }
    }

    /// Copies person `id` into the draft and switches to edit mode.
    ///
    /// # Errors
    /// - `UnknownPerson` when `id` is not stored; the draft is untouched.
    pub fn begin_edit(&mut self, id: PersonId) -> Result<(), FormError> {
        let person = self.store.get(id).ok_or(FormError::UnknownPerson(id))?;
        self.draft = person.to_draft();
        self.editing = Some(id);
        Ok(())
    }

    /// Validates the draft and creates or updates the person.
    ///
    /// On success the form is cleared. On failure draft and mode are kept.
    pub fn save(&mut self) -> Result<SaveOutcome, FormError> {
        self.draft.validate()?;

        let outcome = match self.editing {
            Some(id) => {
                self.store.update(id, self.draft.clone())?;
                SaveOutcome::Updated(id)
            }
            None => {
                let created = self
                    .store
                    .create(self.draft.clone())?
                    .last()
                    .map(|person| person.id)
                    .ok_or(FormError::InconsistentState(
                        "created person missing from list",
                    ))?;
                SaveOutcome::Created(created)
            }
        };

        info!(
            "event=form_save module=service status=ok outcome={:?}",
            outcome
        );
        self.clear();
        Ok(outcome)
    }

    /// Deletes person `id`. Leaves edit mode when it was the edit target.
    pub fn delete(&mut self, id: PersonId) -> Result<(), FormError> {
        self.store.delete(id)?;
        if self.editing == Some(id) {
            self.clear();
        }
        Ok(())
    }

    /// Resets every field, the photo and the edit target.
    pub fn clear(&mut self) {
        self.draft = PersonDraft::default();
        self.editing = None;
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &PeopleStore<S> {
        &self.store
    }

    /// Gives back the underlying store.
    pub fn into_store(self) -> PeopleStore<S> {
        self.store
    }
}
