//! # Listing Module
//!
//! The authoritative online card listing, already materialized to disk.
//!
//! Fetching is done elsewhere; this module reads one JSON manifest per set:
//!
//! ```json
//! {
//!   "set_name": "Genetic Apex",
//!   "packs": {
//!     "pikachu-pack": [
//!       { "number": "005", "name": "Bulbasaur", "rarity": "C", "image": "refs/a1-005.png" },
//!       { "url": "/cards/a1/094/pikachu-ex/", "rarity": "RR", "image": "refs/a1-094.png" }
//!     ]
//!   },
//!   "promo": [ { "number": "001", "name": "Potion", "rarity": "C", "image": "refs/pa-001.png" } ]
//! }
//! ```
//!
//! Relative image paths resolve against the manifest's directory. Within a
//! multi-pack set, a number listed by exactly one pack is exclusive to it.

mod url;

pub use url::{slug_to_card_name, CardUrl};

use crate::core::catalog::SetConfig;
use crate::error::ListingError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// An online-sourced card that local images are matched against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCard {
    /// Set-scoped card number, e.g. `005`
    pub number: String,
    pub name: String,
    /// Rarity code, see [`crate::core::catalog::RarityTable`]
    pub rarity: String,
    pub reference_image: PathBuf,
    /// Pack that exclusively offers this card, if any
    #[serde(default)]
    pub pack_affinity: Option<String>,
}

impl CandidateCard {
    pub fn new(number: &str, name: &str, rarity: &str, reference_image: impl Into<PathBuf>) -> Self {
        Self {
            number: number.to_string(),
            name: name.to_string(),
            rarity: rarity.to_string(),
            reference_image: reference_image.into(),
            pack_affinity: None,
        }
    }

    pub fn exclusive_to(mut self, pack: &str) -> Self {
        self.pack_affinity = Some(pack.to_string());
        self
    }
}

/// One entry of a listing manifest.
///
/// Either `number` and `name` are given, or they are parsed from `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedCard {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub rarity: String,
    pub image: PathBuf,
}

impl ListedCard {
    fn into_candidate(self, base_dir: &Path) -> Result<CandidateCard, ListingError> {
        let parsed = self.url.as_deref().map(CardUrl::parse).transpose()?;

        let number = match (self.number, &parsed) {
            (Some(number), _) => number,
            (None, Some(url)) => url.number.clone(),
            (None, None) => return Err(ListingError::MissingNumber { name: self.name }),
        };
        let name = self
            .name
            .or_else(|| parsed.map(|url| url.name))
            .unwrap_or_default();

        let reference_image = if self.image.is_absolute() {
            self.image
        } else {
            base_dir.join(self.image)
        };

        Ok(CandidateCard {
            number,
            name,
            rarity: self.rarity,
            reference_image,
            pack_affinity: None,
        })
    }
}

/// Listing manifest for one set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetListing {
    pub set_name: String,
    #[serde(default)]
    pub packs: BTreeMap<String, Vec<ListedCard>>,
    #[serde(default)]
    pub promo: Vec<ListedCard>,
    /// Directory relative image paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl SetListing {
    pub fn load(path: &Path) -> Result<Self, ListingError> {
        let text = fs::read_to_string(path).map_err(|e| ListingError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut listing: SetListing = serde_json::from_str(&text).map_err(|e| ListingError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        listing.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(listing)
    }

    /// Convert the manifest into candidate pools, deriving pack affinity.
    ///
    /// Malformed entries are logged and reported in
    /// [`CandidatePools::rejected`]; the rest of the listing is kept.
    pub fn into_pools(self, set: &SetConfig) -> CandidatePools {
        let mut rejected = Vec::new();
        let base_dir = self.base_dir;

        let mut convert = |cards: Vec<ListedCard>, pool: &str| -> Vec<CandidateCard> {
            cards
                .into_iter()
                .filter_map(|card| match card.into_candidate(&base_dir) {
                    Ok(candidate) => Some(candidate),
                    Err(e) => {
                        warn!(pool, error = %e, "Dropping malformed listing entry");
                        rejected.push(e);
                        None
                    }
                })
                .collect()
        };

        let mut packs: Vec<CandidatePool> = self
            .packs
            .into_iter()
            .map(|(pack, cards)| {
                let candidates = convert(cards, &pack);
                CandidatePool { pack, candidates }
            })
            .collect();
        let promo = convert(self.promo, "promo");

        if set.has_packs() {
            assign_pack_affinity(&mut packs);
        }

        CandidatePools {
            packs,
            promo,
            rejected,
        }
    }
}

/// Candidates offered by one pack (or the whole set when it has no packs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePool {
    pub pack: String,
    pub candidates: Vec<CandidateCard>,
}

#[derive(Debug, Default)]
pub struct CandidatePools {
    pub packs: Vec<CandidatePool>,
    pub promo: Vec<CandidateCard>,
    pub rejected: Vec<ListingError>,
}

/// Mark every card listed by exactly one pack as exclusive to that pack.
pub fn assign_pack_affinity(pools: &mut [CandidatePool]) {
    let mut appearances: HashMap<String, usize> = HashMap::new();
    for pool in pools.iter() {
        for card in &pool.candidates {
            *appearances.entry(card.number.clone()).or_default() += 1;
        }
    }

    for pool in pools.iter_mut() {
        for card in &mut pool.candidates {
            card.pack_affinity = (appearances.get(&card.number) == Some(&1)).then(|| pool.pack.clone());
        }
    }
}
