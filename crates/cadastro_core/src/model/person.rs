//! Person domain model.
//!
//! # Responsibility
//! - Define the persisted person record and the id-less draft used by forms.
//! - Provide required-field validation and id allocation helpers.
//!
//! # Invariants
//! - Serialized field names match the persisted `people` layout exactly:
//!   `id, photo, name, address, city, state, phone`.
//! - `next_person_id` never returns an id already present in the collection.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of a stored person.
///
/// Kept as an integer to match the persisted JSON layout.
pub type PersonId = i64;

/// Text fields captured by the registration form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonField {
    Name,
    Address,
    City,
    State,
    Phone,
}

impl PersonField {
    /// All text fields in the order the form renders and validates them.
    pub const ALL: [PersonField; 5] = [
        PersonField::Name,
        PersonField::Address,
        PersonField::City,
        PersonField::State,
        PersonField::Phone,
    ];

    /// Stable field name, identical to the persisted JSON key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::Phone => "phone",
        }
    }
}

impl Display for PersonField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for drafts about to be saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonValidationError {
    /// No photo reference was selected.
    MissingPhoto,
    /// A required text field is empty or whitespace only.
    MissingField(PersonField),
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPhoto => write!(f, "photo is required"),
            Self::MissingField(field) => write!(f, "field `{field}` is required"),
        }
    }
}

impl Error for PersonValidationError {}

/// Form input for one person, everything except the id.
///
/// Passed wholesale to store operations instead of field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDraft {
    /// Opaque image reference (for example a `file://` URI).
    pub photo: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
}

impl PersonDraft {
    /// Checks that the photo and every text field are present.
    ///
    /// # Errors
    /// - `MissingPhoto` when `photo` is blank.
    /// - `MissingField` for the first blank text field in form order.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if is_blank(&self.photo) {
            return Err(PersonValidationError::MissingPhoto);
        }

        for field in PersonField::ALL {
            if is_blank(self.field(field)) {
                return Err(PersonValidationError::MissingField(field));
            }
        }

        Ok(())
    }

    /// Returns the current value of one text field.
    pub fn field(&self, field: PersonField) -> &str {
        match field {
            PersonField::Name => &self.name,
            PersonField::Address => &self.address,
            PersonField::City => &self.city,
            PersonField::State => &self.state,
            PersonField::Phone => &self.phone,
        }
    }

    /// Replaces the value of one text field.
    pub fn set_field(&mut self, field: PersonField, value: impl Into<String>) {
        let value = value.into();
        match field {
            PersonField::Name => self.name = value,
            PersonField::Address => self.address = value,
            PersonField::City => self.city = value,
            PersonField::State => self.state = value,
            PersonField::Phone => self.phone = value,
        }
    }
}

/// Canonical persisted person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub photo: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
}

impl Person {
    /// Builds a record from a draft and an already allocated id.
    ///
    /// Does not validate; callers run `PersonDraft::validate()` first.
    pub fn from_draft(id: PersonId, draft: PersonDraft) -> Self {
        Self {
            id,
            photo: draft.photo,
            name: draft.name,
            address: draft.address,
            city: draft.city,
            state: draft.state,
            phone: draft.phone,
        }
    }

    /// Copies this record back into an editable draft.
    pub fn to_draft(&self) -> PersonDraft {
        PersonDraft {
            photo: self.photo.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Allocates an id for a new person.
///
/// Ids follow creation time in epoch milliseconds, bumped past the largest
/// existing id so two creates within the same millisecond never collide.
/// When the largest id is `PersonId::MAX`, the smallest unused positive id
/// is taken instead.
pub fn next_person_id(existing: &[Person], now_epoch_ms: i64) -> PersonId {
    match existing.iter().map(|person| person.id).max() {
        Some(max_id) if max_id >= now_epoch_ms => max_id
            .checked_add(1)
            .unwrap_or_else(|| smallest_unused_id(existing)),
        _ => now_epoch_ms,
    }
}

fn smallest_unused_id(existing: &[Person]) -> PersonId {
    let used = existing
        .iter()
        .map(|person| person.id)
        .collect::<HashSet<_>>();
    // `existing.len() + 1` candidates always contain a free id.
    (1..=PersonId::MAX)
        .find(|id| !used.contains(id))
        .unwrap_or_default()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
