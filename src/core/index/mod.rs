//! # Candidate Index
//!
//! Fingerprints for every candidate of one pack (or promo pool), computed
//! once up front so matching never touches the reference images again.
//!
//! Candidates whose reference image cannot be decoded are excluded and
//! reported; the index is still usable with the remainder.

use crate::core::hasher::{Fingerprint, HashAlgorithm};
use crate::core::listing::CandidateCard;
use crate::error::ListingError;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct IndexedCandidate {
    pub card: CandidateCard,
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Default)]
pub struct CandidateIndex {
    entries: Vec<IndexedCandidate>,
    by_number: HashMap<String, usize>,
    unavailable: Vec<ListingError>,
}

impl CandidateIndex {
    /// Hash every reference image, in parallel, keeping input order.
    pub fn build(candidates: Vec<CandidateCard>, hasher: &dyn HashAlgorithm) -> Self {
        let hashed: Vec<(CandidateCard, Result<Fingerprint, String>)> = candidates
            .into_par_iter()
            .map(|card| {
                let fingerprint = hasher
                    .hash_file(&card.reference_image)
                    .map_err(|e| e.to_string());
                (card, fingerprint)
            })
            .collect();

        let mut index = Self::default();
        for (card, fingerprint) in hashed {
            match fingerprint {
                Ok(fingerprint) => index.insert(IndexedCandidate { card, fingerprint }),
                Err(reason) => {
                    warn!(number = %card.number, %reason, "Reference image unavailable; candidate excluded");
                    index.unavailable.push(ListingError::CandidateImageUnavailable {
                        number: card.number,
                        reason,
                    });
                }
            }
        }

        debug!(
            indexed = index.entries.len(),
            unavailable = index.unavailable.len(),
            "Candidate index built"
        );
        index
    }

    /// Build from fingerprints computed elsewhere.
    pub fn from_fingerprints(entries: impl IntoIterator<Item = (CandidateCard, Fingerprint)>) -> Self {
        let mut index = Self::default();
        for (card, fingerprint) in entries {
            index.insert(IndexedCandidate { card, fingerprint });
        }
        index
    }

    fn insert(&mut self, entry: IndexedCandidate) {
        if self.by_number.contains_key(&entry.card.number) {
            warn!(number = %entry.card.number, "Duplicate card number in listing; keeping the first");
            return;
        }
        self.by_number.insert(entry.card.number.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Candidates in listing order.
    pub fn all_candidates(&self) -> impl Iterator<Item = &CandidateCard> {
        self.entries.iter().map(|e| &e.card)
    }

    pub fn entries(&self) -> &[IndexedCandidate] {
        &self.entries
    }

    pub fn get(&self, number: &str) -> Option<&IndexedCandidate> {
        self.by_number.get(number).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidates dropped because their reference image could not be hashed.
    pub fn unavailable(&self) -> &[ListingError] {
        &self.unavailable
    }
}
