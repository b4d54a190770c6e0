//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `cadastro_core` linkage.
//! - Round-trip one person through an on-disk database to prove the storage
//!   path works without the Flutter host.

use cadastro_core::db::open_db;
use cadastro_core::{LoadOutcome, PeopleStore, PersonDraft, SqliteKeyValueStore};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cadastro_core ping={}", cadastro_core::ping());
    println!("cadastro_core version={}", cadastro_core::core_version());

    let db_path = std::env::temp_dir().join(format!(
        "cadastro-cli-smoke-{}.sqlite3",
        std::process::id()
    ));
    let result = smoke_roundtrip(&db_path);
    // Best effort: the smoke database is throwaway.
    let _ = std::fs::remove_file(&db_path);

    let (outcome, count) = result?;
    println!("cadastro_core people_reload={outcome:?} count={count}");
    Ok(())
}

/// Creates one person in a fresh database at `db_path`, reopens it, and
/// returns what the reload saw.
fn smoke_roundtrip(db_path: &Path) -> Result<(LoadOutcome, usize), Box<dyn Error>> {
    {
        let conn = open_db(db_path)?;
        let mut store = PeopleStore::new(SqliteKeyValueStore::try_new(&conn)?);
        store.load()?;
        store.create(PersonDraft {
            photo: "file://smoke.jpg".to_string(),
            name: "Smoke".to_string(),
            address: "Rua A".to_string(),
            city: "X".to_string(),
            state: "Y".to_string(),
            phone: "000".to_string(),
        })?;
    }

    let conn = open_db(db_path)?;
    let mut store = PeopleStore::new(SqliteKeyValueStore::try_new(&conn)?);
    let outcome = store.load()?;
    Ok((outcome, store.list().len()))
}

#[cfg(test)]
mod tests {
    use super::smoke_roundtrip;
    use cadastro_core::LoadOutcome;

    #[test]
    fn smoke_roundtrip_reloads_created_person() {
        let dir = tempfile::tempdir().unwrap();
        let (outcome, count) = smoke_roundtrip(&dir.path().join("smoke.sqlite3")).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { count: 1 });
        assert_eq!(count, 1);
    }
}
