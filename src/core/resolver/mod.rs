//! # Attribute Resolver
//!
//! Turns a matched candidate into a [`CardRecord`].
//!
//! Every derived field is a pure function of the candidate, the set
//! configuration and whether the card came from the promo pool:
//!
//! | Field             | Main pool                                   | Promo pool        |
//! |-------------------|---------------------------------------------|-------------------|
//! | `card_set`        | initials, plus pack suffix when exclusive   | initials          |
//! | `card_set_name`   | pack name when exclusive, else short name   | short name        |
//! | `expansion_id`    | capitalized set expansion id                | `Promo-a`         |
//! | `card_tradable`   | rank below the tradable cutoff (SR)         | false             |
//! | `card_obtainable` | rank below the obtainable cutoff (IM)       | false             |

mod record;

pub use record::CardRecord;

use crate::core::catalog::{capitalize, RarityTable, SetConfig, PROMO_EXPANSION_ID};
use crate::core::listing::CandidateCard;
use crate::error::{ConfigError, ResolveError};
use serde::{Deserialize, Serialize};

/// Which candidate pool a card was matched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    Main,
    Promo,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKind::Main => write!(f, "main"),
            PoolKind::Promo => write!(f, "promo"),
        }
    }
}

/// The set a card is being resolved for.
#[derive(Debug, Clone, Copy)]
pub struct SetContext<'a> {
    pub set: &'a SetConfig,
    pub pool: PoolKind,
}

impl<'a> SetContext<'a> {
    pub fn main(set: &'a SetConfig) -> Self {
        Self { set, pool: PoolKind::Main }
    }

    pub fn promo(set: &'a SetConfig) -> Self {
        Self { set, pool: PoolKind::Promo }
    }
}

pub struct AttributeResolver<'a> {
    rarities: &'a RarityTable,
}

impl<'a> AttributeResolver<'a> {
    pub fn new(rarities: &'a RarityTable) -> Self {
        Self { rarities }
    }

    pub fn resolve(&self, candidate: &CandidateCard, context: SetContext<'_>) -> Result<CardRecord, ResolveError> {
        let set = context.set;
        let rank = self
            .rarities
            .rank(&candidate.rarity)
            .ok_or_else(|| ResolveError::UnknownRarityCode {
                number: candidate.number.clone(),
                code: candidate.rarity.clone(),
            })?;

        let (card_tradable, card_obtainable) = self.flags(rank, context.pool);

        let (card_set, card_set_name, expansion_id) = match (context.pool, &candidate.pack_affinity) {
            (PoolKind::Promo, _) => (
                set.initials(),
                set.short_name().to_string(),
                PROMO_EXPANSION_ID.to_string(),
            ),
            (PoolKind::Main, Some(pack)) => {
                let suffix = set.pack_suffix(pack).ok_or_else(|| ConfigError::MissingPack {
                    set_name: set.name.clone(),
                    pack: pack.clone(),
                })?;
                (
                    format!("{}{}", set.initials(), suffix),
                    pack_display_name(pack),
                    set.record_expansion_id(),
                )
            }
            (PoolKind::Main, None) => (
                set.initials(),
                set.short_name().to_string(),
                set.record_expansion_id(),
            ),
        };

        Ok(CardRecord {
            card_number: candidate.number.clone(),
            card_name: candidate.name.clone(),
            card_rarity: rank,
            card_set,
            card_set_name,
            card_set_base_name: set.name.clone(),
            expansion_id,
            card_desirability: 0,
            card_tradable,
            card_obtainable,
        })
    }

    /// `(tradable, obtainable)` for a rank in a pool.
    pub fn flags(&self, rank: u8, pool: PoolKind) -> (bool, bool) {
        match pool {
            PoolKind::Promo => (false, false),
            PoolKind::Main => (self.rarities.is_tradable(rank), self.rarities.is_obtainable(rank)),
        }
    }
}

/// `pikachu-pack` → `Pikachu`.
fn pack_display_name(pack: &str) -> String {
    capitalize(pack.split('-').next().unwrap_or(pack))
}
