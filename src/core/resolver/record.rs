//! The output unit of the database.

use serde::{Deserialize, Serialize};

/// One card of the assembled database.
///
/// Field names are the on-disk JSON keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub card_number: String,
    pub card_name: String,
    /// Rarity rank, not the code
    pub card_rarity: u8,
    pub card_set: String,
    pub card_set_name: String,
    pub card_set_base_name: String,
    pub expansion_id: String,
    #[serde(default)]
    pub card_desirability: i64,
    pub card_tradable: bool,
    pub card_obtainable: bool,
}

impl CardRecord {
    /// Database key, unique within one assembled database.
    pub fn key(&self) -> String {
        format!("{}_{}", self.card_set, self.card_number)
    }
}
