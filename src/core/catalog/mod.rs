//! # Catalog Module
//!
//! Immutable run configuration: which sets exist, how their packs are
//! suffixed, and how rarity codes rank.
//!
//! A [`Catalog`] is loaded once per run and passed by reference to every
//! component that needs it. The built-in [`Catalog::pocket`] covers the
//! released Pocket sets; a JSON file with the same shape replaces it.
//!
//! ```json
//! {
//!   "sets": [
//!     { "name": "Genetic Apex", "expansion_id": "a1",
//!       "packs": { "charizard-pack": "C", "mewtwo-pack": "M", "pikachu-pack": "P" } }
//!   ],
//!   "rarities": { "entries": [ { "code": "C", "rank": 1, "symbol": "◊" } ],
//!                 "tradable_below": "SR", "obtainable_below": "IM" }
//! }
//! ```

mod rarity;

pub use rarity::{RarityEntry, RarityTable};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Expansion id given to every promo-pool record.
pub const PROMO_EXPANSION_ID: &str = "Promo-a";

/// One base set and its packs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetConfig {
    /// Display name, e.g. `Genetic Apex`
    pub name: String,
    /// Identifier used by the online source, e.g. `a1`
    pub expansion_id: String,
    /// Overrides the initials derived from the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    /// Pack name → one-letter suffix; empty for single-pack sets
    #[serde(default)]
    pub packs: BTreeMap<String, String>,
}

impl SetConfig {
    pub fn new(name: &str, expansion_id: &str) -> Self {
        Self {
            name: name.to_string(),
            expansion_id: expansion_id.to_string(),
            initials: None,
            packs: BTreeMap::new(),
        }
    }

    pub fn with_pack(mut self, pack: &str, suffix: &str) -> Self {
        self.packs.insert(pack.to_string(), suffix.to_string());
        self
    }

    /// Base set code: first letter of every word, splitting on whitespace
    /// and hyphens (`Space-Time Smackdown` → `STS`).
    pub fn initials(&self) -> String {
        if let Some(initials) = &self.initials {
            return initials.clone();
        }
        self.name
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// First whitespace-separated word of the set name.
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// Expansion id as written into records (`a1a` → `A1a`).
    pub fn record_expansion_id(&self) -> String {
        capitalize(&self.expansion_id)
    }

    pub fn pack_suffix(&self, pack: &str) -> Option<&str> {
        self.packs.get(pack).map(String::as_str)
    }

    pub fn has_packs(&self) -> bool {
        !self.packs.is_empty()
    }
}

/// Sets and rarity table for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub sets: Vec<SetConfig>,
    #[serde(default)]
    pub rarities: RarityTable,
}

impl Catalog {
    pub fn pocket() -> Self {
        Self {
            sets: vec![
                SetConfig::new("Genetic Apex", "a1")
                    .with_pack("charizard-pack", "C")
                    .with_pack("mewtwo-pack", "M")
                    .with_pack("pikachu-pack", "P"),
                SetConfig::new("Mythical Island", "a1a"),
                SetConfig::new("Space-Time Smackdown", "a2")
                    .with_pack("dialga-pack", "D")
                    .with_pack("palkia-pack", "P"),
                SetConfig::new("Triumphant Light", "a2a"),
                SetConfig::new("Shining Revelry", "a2b"),
            ],
            rarities: RarityTable::pocket(),
        }
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let unreadable = |reason: String| ConfigError::CatalogUnreadable {
            path: path.to_path_buf(),
            reason,
        };

        let text = fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        let catalog: Catalog = serde_json::from_str(&text).map_err(|e| unreadable(e.to_string()))?;

        if let Some(code) = catalog.rarities.missing_cutoff() {
            return Err(unreadable(format!("rarity cutoff {:?} is not in the rarity table", code)));
        }

        Ok(catalog)
    }

    pub fn set(&self, name: &str) -> Result<&SetConfig, ConfigError> {
        self.sets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownSet {
                set_name: name.to_string(),
            })
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|s| s.name.as_str())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::pocket()
    }
}

/// Upper-case the first character and lower-case the rest.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn initials_split_on_spaces_and_hyphens() {
        let catalog = Catalog::pocket();
        assert_eq!(catalog.set("Genetic Apex").unwrap().initials(), "GA");
        assert_eq!(catalog.set("Space-Time Smackdown").unwrap().initials(), "STS");
        assert_eq!(catalog.set("Triumphant Light").unwrap().initials(), "TL");
    }

    #[test]
    fn initials_override_wins() {
        let mut set = SetConfig::new("Space-Time Smackdown", "a2");
        set.initials = Some("STX".to_string());
        assert_eq!(set.initials(), "STX");
    }

    #[test]
    fn short_name_keeps_hyphenated_word() {
        let catalog = Catalog::pocket();
        assert_eq!(catalog.set("Space-Time Smackdown").unwrap().short_name(), "Space-Time");
        assert_eq!(catalog.set("Mythical Island").unwrap().short_name(), "Mythical");
    }

    #[test]
    fn record_expansion_id_is_capitalized() {
        let catalog = Catalog::pocket();
        assert_eq!(catalog.set("Genetic Apex").unwrap().record_expansion_id(), "A1");
        assert_eq!(catalog.set("Mythical Island").unwrap().record_expansion_id(), "A1a");
        assert_eq!(capitalize("promo-A"), "Promo-a");
    }

    #[test]
    fn unknown_set_is_a_configuration_error() {
        let err = Catalog::pocket().set("Nowhere").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSet { .. }));
    }

    #[test]
    fn load_reads_json_and_defaults_rarities() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sets":[{{"name":"Genetic Apex","expansion_id":"a1","packs":{{"pikachu-pack":"P"}}}}]}}"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        let set = catalog.set("Genetic Apex").unwrap();
        assert_eq!(set.pack_suffix("pikachu-pack"), Some("P"));
        assert_eq!(catalog.rarities, RarityTable::pocket());
    }

    #[test]
    fn load_rejects_cutoff_outside_table() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sets":[],"rarities":{{"entries":[{{"code":"C","rank":1,"symbol":"◊"}}],"tradable_below":"SR","obtainable_below":"C"}}}}"#
        )
        .unwrap();

        assert!(matches!(
            Catalog::load(file.path()),
            Err(ConfigError::CatalogUnreadable { .. })
        ));
    }
}
