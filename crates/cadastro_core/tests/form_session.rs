use cadastro_core::{
    FormError, FormMode, FormSession, KeyValueStore, LoadOutcome, MemoryKeyValueStore,
    PeopleStore, PersonField, PersonValidationError, PhotoPicker, SaveOutcome, StorageError,
    StorageResult, StoreError, PEOPLE_KEY,
};
use std::cell::Cell;

struct FixedPicker(Option<&'static str>);

impl PhotoPicker for FixedPicker {
    fn pick(&mut self) -> Option<String> {
        self.0.map(str::to_string)
    }
}

/// Memory backend whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_writes: Cell<bool>,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(StorageError::Backend("disk full".to_string()));
        }
        self.inner.set(key, value)
    }
}

fn open_session() -> FormSession<MemoryKeyValueStore> {
    let (session, outcome) =
        FormSession::open(PeopleStore::new(MemoryKeyValueStore::new())).unwrap();
    assert_eq!(outcome, LoadOutcome::Empty);
    session
}

fn fill<S: KeyValueStore>(form: &mut FormSession<S>, name: &str, phone: &str) {
    form.pick_photo(&mut FixedPicker(Some("file://a.jpg")));
    form.set_field(PersonField::Name, name);
    form.set_field(PersonField::Address, "Rua A");
    form.set_field(PersonField::City, "X");
    form.set_field(PersonField::State, "Y");
    form.set_field(PersonField::Phone, phone);
}

#[test]
fn save_in_create_mode_appends_and_clears_form() {
    let mut form = open_session();
    fill(&mut form, "Ana", "123");

    let outcome = form.save().unwrap();
    let SaveOutcome::Created(id) = outcome else {
        panic!("expected create, got {outcome:?}");
    };

    assert_eq!(form.people().len(), 1);
    assert_eq!(form.people()[0].id, id);
    assert_eq!(form.people()[0].name, "Ana");
    assert_eq!(form.photo(), None);
    assert!(form.draft().name.is_empty());
    assert_eq!(form.mode(), FormMode::Create);
}

#[test]
fn edit_flow_updates_in_place() {
    let mut form = open_session();
    fill(&mut form, "Ana", "123");
    form.save().unwrap();
    fill(&mut form, "Bia", "456");
    form.save().unwrap();
    let ana_id = form.people()[0].id;

    form.begin_edit(ana_id).unwrap();
    assert_eq!(form.mode(), FormMode::Edit(ana_id));
    assert_eq!(form.submit_label(), "Atualizar");
    assert_eq!(form.draft().phone, "123");
    assert_eq!(form.photo(), Some("file://a.jpg"));

    form.set_field(PersonField::Phone, "999");
    assert_eq!(form.save().unwrap(), SaveOutcome::Updated(ana_id));

    assert_eq!(form.people().len(), 2);
    assert_eq!(form.people()[0].id, ana_id);
    assert_eq!(form.people()[0].phone, "999");
    assert_eq!(form.people()[1].name, "Bia");
    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(form.submit_label(), "Salvar");
}

#[test]
fn save_with_missing_phone_blocks_and_keeps_draft() {
    let mut form = open_session();
    fill(&mut form, "Ana", "");

    let err = form.save().unwrap_err();
    assert!(matches!(
        err,
        FormError::Validation(PersonValidationError::MissingField(PersonField::Phone))
    ));
    assert!(form.people().is_empty());
    assert_eq!(form.draft().name, "Ana");
    assert_eq!(form.photo(), Some("file://a.jpg"));
}

#[test]
fn save_without_photo_is_rejected() {
    let mut form = open_session();
    fill(&mut form, "Ana", "123");
    form.set_photo(None);

    let err = form.save().unwrap_err();
    assert!(matches!(
        err,
        FormError::Validation(PersonValidationError::MissingPhoto)
    ));
    assert!(form.people().is_empty());
}

#[test]
fn deleting_edit_target_leaves_edit_mode() {
    let mut form = open_session();
    fill(&mut form, "Ana", "123");
    form.save().unwrap();
    let id = form.people()[0].id;

    form.begin_edit(id).unwrap();
    form.delete(id).unwrap();

    assert!(form.people().is_empty());
    assert_eq!(form.mode(), FormMode::Create);
    assert!(form.draft().name.is_empty());
}

#[test]
fn deleting_other_record_keeps_edit_mode() {
    let mut form = open_session();
    fill(&mut form, "Ana", "123");
    form.save().unwrap();
    fill(&mut form, "Bia", "456");
    form.save().unwrap();
    let ana_id = form.people()[0].id;
    let bia_id = form.people()[1].id;

    form.begin_edit(ana_id).unwrap();
    form.delete(bia_id).unwrap();

    assert_eq!(form.mode(), FormMode::Edit(ana_id));
    assert_eq!(form.draft().name, "Ana");
    assert_eq!(form.people().len(), 1);
}

#[test]
fn clear_resets_draft_and_mode() {
    let mut form = open_session();
    fill(&mut form, "Ana", "123");
    form.save().unwrap();
    let id = form.people()[0].id;
    form.begin_edit(id).unwrap();

    form.clear();

    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(form.photo(), None);
    assert!(form.draft().phone.is_empty());
}

#[test]
fn session_persists_through_store() {
    let mut form = open_session();
    fill(&mut form, "Ana", "123");
    form.save().unwrap();

    let store = form.into_store();
    let raw = store.storage().get(PEOPLE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"name\":\"Ana\""));
}

#[test]
fn failed_write_keeps_draft_and_mode_for_retry() {
    let (mut form, _) = FormSession::open(PeopleStore::new(FlakyStore::default())).unwrap();
    fill(&mut form, "Ana", "123");
    form.save().unwrap();
    let id = form.people()[0].id;
    let people_before = form.people().to_vec();

    form.begin_edit(id).unwrap();
    form.set_field(PersonField::Phone, "999");
    let draft_before = form.draft().clone();
    form.store().storage().fail_writes.set(true);

    let err = form.save().unwrap_err();
    assert!(matches!(
        err,
        FormError::Store(StoreError::Storage(StorageError::Backend(_)))
    ));
    assert_eq!(form.mode(), FormMode::Edit(id));
    assert_eq!(form.draft(), &draft_before);
    assert_eq!(form.people(), people_before.as_slice());

    form.clear();
    fill(&mut form, "Bia", "456");
    let create_draft = form.draft().clone();
    let err = form.save().unwrap_err();
    assert!(matches!(err, FormError::Store(StoreError::Storage(_))));
    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(form.draft(), &create_draft);
    assert_eq!(form.people(), people_before.as_slice());
}
