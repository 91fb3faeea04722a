//! Integration tests for database files and desirability transfer.

use assert_fs::prelude::*;
use predicates::prelude::*;
use tcgp_card_db::core::desirability::transfer_files;
use tcgp_card_db::core::export::{read_database, write_database};
use tcgp_card_db::core::resolver::CardRecord;

fn record(number: &str, card_set: &str, desirability: i64) -> CardRecord {
    CardRecord {
        card_number: number.to_string(),
        card_name: format!("Card {}", number),
        card_rarity: 2,
        card_set: card_set.to_string(),
        card_set_name: "Triumphant".to_string(),
        card_set_base_name: "Triumphant Light".to_string(),
        expansion_id: "A2a".to_string(),
        card_desirability: desirability,
        card_tradable: true,
        card_obtainable: true,
    }
}

#[test]
fn database_file_is_pretty_keyed_json() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("TL_Cards_Database.json");

    write_database(file.path(), &[record("001", "TL", 0), record("002", "TL", 0)]).unwrap();

    file.assert(predicate::path::exists());
    file.assert(predicate::str::contains("\"TL_001\": {"));
    file.assert(predicate::str::contains("\"card_set_base_name\": \"Triumphant Light\""));
    file.assert(predicate::str::is_match(r#"(?s)"TL_001".*"TL_002""#).unwrap());
}

#[test]
fn creates_missing_output_directories() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("out/nested/TL_Cards_Database.json");

    write_database(file.path(), &[record("001", "TL", 0)]).unwrap();
    file.assert(predicate::path::is_file());
}

#[test]
fn transfer_writes_to_separate_destination() {
    let temp = assert_fs::TempDir::new().unwrap();
    let old = temp.child("old.json");
    let new = temp.child("new.json");
    let merged = temp.child("merged.json");

    write_database(old.path(), &[record("001", "TL", 4), record("099", "TL", 2)]).unwrap();
    write_database(new.path(), &[record("001", "TL", 0)]).unwrap();

    let report = transfer_files(old.path(), new.path(), Some(merged.path())).unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.not_found.len(), 1);
    assert_eq!(report.total_old, 2);

    new.assert(predicate::str::contains("\"card_desirability\": 0"));
    merged.assert(predicate::str::contains("\"card_desirability\": 4"));

    let database = read_database(merged.path()).unwrap();
    assert_eq!(database.len(), 1);
}

#[test]
fn transfer_fails_on_missing_old_database() {
    let temp = assert_fs::TempDir::new().unwrap();
    let new = temp.child("new.json");
    write_database(new.path(), &[record("001", "TL", 0)]).unwrap();

    let result = transfer_files(temp.child("absent.json").path(), new.path(), None);
    assert!(result.is_err());
}
