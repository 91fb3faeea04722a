//! Rarity table: code → (rank, display symbol).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityEntry {
    pub code: String,
    pub rank: u8,
    pub symbol: String,
}

/// Ordered rarity table plus the two cutoffs that drive record flags.
///
/// A card is tradable while its rank is strictly below the rank of
/// `tradable_below`, and obtainable from random packs while strictly below
/// `obtainable_below`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityTable {
    pub entries: Vec<RarityEntry>,
    pub tradable_below: String,
    pub obtainable_below: String,
}

impl RarityTable {
    /// The Pocket rarity ladder, C (1) through IR (12).
    pub fn pocket() -> Self {
        let ladder = [
            ("C", "◊"),
            ("U", "◊◊"),
            ("R", "◊◊◊"),
            ("RR", "◊◊◊◊"),
            ("AR", "☆"),
            ("SR", "☆☆"),
            ("SAR", "☆☆"),
            ("IM", "☆☆☆"),
            ("UR", "♛"),
            ("S", "✵"),
            ("SSR", "✵✵"),
            ("IR", "✵✵✵"),
        ];

        Self {
            entries: ladder
                .iter()
                .enumerate()
                .map(|(i, (code, symbol))| RarityEntry {
                    code: code.to_string(),
                    rank: i as u8 + 1,
                    symbol: symbol.to_string(),
                })
                .collect(),
            tradable_below: "SR".to_string(),
            obtainable_below: "IM".to_string(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&RarityEntry> {
        self.entries.iter().find(|e| e.code == code)
    }

    pub fn rank(&self, code: &str) -> Option<u8> {
        self.get(code).map(|e| e.rank)
    }

    pub fn is_tradable(&self, rank: u8) -> bool {
        self.rank(&self.tradable_below).is_some_and(|cutoff| rank < cutoff)
    }

    pub fn is_obtainable(&self, rank: u8) -> bool {
        self.rank(&self.obtainable_below).is_some_and(|cutoff| rank < cutoff)
    }

    /// Returns the first cutoff code missing from the table, if any.
    pub(crate) fn missing_cutoff(&self) -> Option<&str> {
        [&self.tradable_below, &self.obtainable_below]
            .into_iter()
            .find(|code| self.get(code).is_none())
            .map(String::as_str)
    }
}

impl Default for RarityTable {
    fn default() -> Self {
        Self::pocket()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pocket_ranks_follow_the_ladder() {
        let table = RarityTable::pocket();
        assert_eq!(table.rank("C"), Some(1));
        assert_eq!(table.rank("SR"), Some(6));
        assert_eq!(table.rank("IM"), Some(8));
        assert_eq!(table.rank("IR"), Some(12));
        assert_eq!(table.rank("XR"), None);
    }

    #[test]
    fn cutoffs_are_exclusive() {
        let table = RarityTable::pocket();
        assert!(table.is_tradable(5));
        assert!(!table.is_tradable(6));
        assert!(table.is_obtainable(7));
        assert!(!table.is_obtainable(8));
    }

    #[test]
    fn unknown_cutoff_is_reported() {
        let mut table = RarityTable::pocket();
        assert_eq!(table.missing_cutoff(), None);
        table.obtainable_below = "ZZ".to_string();
        assert_eq!(table.missing_cutoff(), Some("ZZ"));
    }
}
