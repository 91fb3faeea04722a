//! Card database files.
//!
//! A database is a JSON object mapping `<card_set>_<card_number>` to a
//! record. Keys are written in record order and read back in file order.

use crate::core::resolver::CardRecord;
use crate::error::ExportError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Records keyed by [`CardRecord::key`], in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDatabase {
    entries: Vec<(String, CardRecord)>,
}

impl CardDatabase {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CardRecord>) -> Self {
        Self {
            entries: records.into_iter().map(|r| (r.key(), r.clone())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CardRecord> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut CardRecord> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CardRecord)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }
}

impl Serialize for CardDatabase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, record) in &self.entries {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CardDatabase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DatabaseVisitor;

        impl<'de> Visitor<'de> for DatabaseVisitor {
            type Value = CardDatabase;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of card records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, record)) = access.next_entry::<String, CardRecord>()? {
                    entries.push((key, record));
                }
                Ok(CardDatabase { entries })
            }
        }

        deserializer.deserialize_map(DatabaseVisitor)
    }
}

/// Write records as a pretty JSON object to any writer.
pub fn export_json<W: Write>(records: &[CardRecord], writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &CardDatabase::from_records(records))
}

/// Write a database file, creating parent directories.
pub fn write_database(path: &Path, records: &[CardRecord]) -> Result<(), ExportError> {
    save(path, &CardDatabase::from_records(records))?;
    info!(path = %path.display(), records = records.len(), "Database written");
    Ok(())
}

pub fn save(path: &Path, database: &CardDatabase) -> Result<(), ExportError> {
    let write_error = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
    serde_json::to_writer_pretty(&mut writer, database).map_err(|source| ExportError::Serde {
        path: path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(write_error)?;
    writer.flush().map_err(write_error)
}

pub fn read_database(path: &Path) -> Result<CardDatabase, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ExportError::Serde {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(number: &str, card_set: &str) -> CardRecord {
        CardRecord {
            card_number: number.to_string(),
            card_name: "Bulbasaur".to_string(),
            card_rarity: 1,
            card_set: card_set.to_string(),
            card_set_name: "Genetic".to_string(),
            card_set_base_name: "Genetic Apex".to_string(),
            expansion_id: "A1".to_string(),
            card_desirability: 0,
            card_tradable: true,
            card_obtainable: true,
        }
    }

    #[test]
    fn keys_keep_record_order() {
        let records = vec![record("9", "GA"), record("010", "GA"), record("010", "GAP")];
        let mut buffer = Vec::new();
        export_json(&records, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let first = text.find("\"GA_9\"").unwrap();
        let second = text.find("\"GA_010\"").unwrap();
        let third = text.find("\"GAP_010\"").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn written_database_reads_back_in_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("GA_Cards_Database.json");
        let records = vec![record("100", "GA"), record("005", "GA")];

        write_database(&path, &records).unwrap();
        let database = read_database(&path).unwrap();

        let keys: Vec<_> = database.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["GA_100", "GA_005"]);
        assert_eq!(database.get("GA_005"), Some(&records[1]));
    }

    #[test]
    fn missing_desirability_defaults_to_zero() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("legacy.json");
        fs::write(
            &path,
            r#"{"MI_001": {"card_number": "001", "card_name": "Exeggcute", "card_rarity": 1,
                "card_set": "MI", "card_set_name": "Mythical", "card_set_base_name": "Mythical Island",
                "expansion_id": "A1a", "card_tradable": true, "card_obtainable": true}}"#,
        )
        .unwrap();

        let database = read_database(&path).unwrap();
        assert_eq!(database.get("MI_001").unwrap().card_desirability, 0);
    }

    #[test]
    fn malformed_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "[1, 2").unwrap();

        let err = read_database(&path).unwrap_err();
        assert!(matches!(err, ExportError::Serde { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
