//! Merging per-pack results into one ordered record list.

use crate::core::matcher::number_key;
use crate::core::resolver::CardRecord;
use crate::error::ConfigError;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

/// A resolved record and where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedCard {
    pub record: CardRecord,
    /// Whether the matched candidate is exclusive to one pack
    pub exclusive: bool,
    pub source: PathBuf,
}

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub records: Vec<CardRecord>,
    /// Records dropped because an earlier one had the same `(card_set, card_number)`
    pub duplicates: usize,
}

/// Collapse duplicates and order the survivors.
///
/// - Records sharing `(card_set, card_number)` collapse to the first one
///   seen. Shared cards carry the bare base code, so the same card matched
///   from several packs yields one record; exclusive cards keep one record
///   per pack suffix.
/// - A number that is exclusive in one record and shared in another is a
///   configuration conflict.
/// - Output is sorted by numeric card number, then `card_set`.
pub fn merge_records(set_name: &str, resolved: Vec<ResolvedCard>) -> Result<MergeOutcome, ConfigError> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut exclusivity: HashMap<String, (bool, String)> = HashMap::new();
    let mut outcome = MergeOutcome::default();

    for card in resolved {
        let record = card.record;

        match exclusivity.get(&record.card_number) {
            Some((exclusive, card_set)) if *exclusive != card.exclusive => {
                let exclusive_set = if *exclusive { card_set.clone() } else { record.card_set.clone() };
                return Err(ConfigError::NumberCollision {
                    set_name: set_name.to_string(),
                    number: record.card_number.clone(),
                    card_set: exclusive_set,
                });
            }
            Some(_) => {}
            None => {
                exclusivity.insert(record.card_number.clone(), (card.exclusive, record.card_set.clone()));
            }
        }

        if !seen.insert((record.card_set.clone(), record.card_number.clone())) {
            debug!(
                key = %record.key(),
                source = %card.source.display(),
                "Collapsing duplicate record"
            );
            outcome.duplicates += 1;
            continue;
        }

        outcome.records.push(record);
    }

    sort_records(&mut outcome.records);
    Ok(outcome)
}

/// Ascending numeric card number, then card set. Stable.
pub fn sort_records(records: &mut [CardRecord]) {
    records.sort_by(|a, b| {
        number_key(&a.card_number)
            .cmp(&number_key(&b.card_number))
            .then_with(|| a.card_set.cmp(&b.card_set))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(number: &str, card_set: &str, exclusive: bool) -> ResolvedCard {
        ResolvedCard {
            record: CardRecord {
                card_number: number.to_string(),
                card_name: format!("Card {}", number),
                card_rarity: 1,
                card_set: card_set.to_string(),
                card_set_name: "Genetic".to_string(),
                card_set_base_name: "Genetic Apex".to_string(),
                expansion_id: "A1".to_string(),
                card_desirability: 0,
                card_tradable: true,
                card_obtainable: true,
            },
            exclusive,
            source: PathBuf::from(format!("/scans/{}-{}.png", card_set, number)),
        }
    }

    #[test]
    fn shared_number_from_two_packs_collapses() {
        let outcome = merge_records(
            "Genetic Apex",
            vec![resolved("005", "GA", false), resolved("005", "GA", false)],
        )
        .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.duplicates, 1);
    }

    #[test]
    fn exclusive_variants_are_kept_per_pack() {
        let outcome = merge_records(
            "Genetic Apex",
            vec![resolved("286", "GAP", true), resolved("286", "GAM", true)],
        )
        .unwrap();

        let sets: Vec<_> = outcome.records.iter().map(|r| r.card_set.as_str()).collect();
        assert_eq!(sets, vec!["GAM", "GAP"]);
    }

    #[test]
    fn exclusive_and_shared_number_collide() {
        let err = merge_records(
            "Genetic Apex",
            vec![resolved("094", "GA", false), resolved("094", "GAP", true)],
        )
        .unwrap_err();

        match err {
            ConfigError::NumberCollision { number, card_set, .. } => {
                assert_eq!(number, "094");
                assert_eq!(card_set, "GAP");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn order_is_numeric_not_lexicographic() {
        let outcome = merge_records(
            "Genetic Apex",
            vec![
                resolved("100", "GA", false),
                resolved("9", "GA", false),
                resolved("010", "GA", false),
            ],
        )
        .unwrap();

        let numbers: Vec<_> = outcome.records.iter().map(|r| r.card_number.as_str()).collect();
        assert_eq!(numbers, vec!["9", "010", "100"]);
    }
}
