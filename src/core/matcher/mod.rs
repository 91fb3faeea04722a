//! # Matcher Module
//!
//! Identifies which candidate a local card scan shows.
//!
//! ## Algorithm
//! 1. Fingerprint the local image
//! 2. Compute the Hamming distance to every candidate in the index
//! 3. Keep the minimum; ties go to the numerically smallest card number
//! 4. Accept only if the minimum is within the threshold
//!
//! The tie-break makes the result independent of listing order.

mod strategy;

pub use strategy::{ComparisonStrategy, MatchType, ThresholdStrategy, DEFAULT_MATCH_THRESHOLD};

use crate::core::hasher::{Fingerprint, HashAlgorithm};
use crate::core::index::{CandidateIndex, IndexedCandidate};
use crate::core::listing::CandidateCard;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A local scan and its fingerprint.
#[derive(Debug, Clone)]
pub struct LocalImage {
    pub path: PathBuf,
    pub fingerprint: Fingerprint,
}

impl LocalImage {
    pub fn load(path: &Path, hasher: &dyn HashAlgorithm) -> Result<Self, MatchFailure> {
        hasher
            .hash_file(path)
            .map(|fingerprint| Self {
                path: path.to_path_buf(),
                fingerprint,
            })
            .map_err(|e| MatchFailure::DecodeFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

/// A successful identification.
#[derive(Debug, Clone, Serialize)]
pub struct CardMatch {
    pub path: PathBuf,
    pub candidate: CandidateCard,
    pub distance: u32,
    pub match_type: MatchType,
}

/// Why a local image produced no card.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchFailure {
    #[error("No candidate within distance {threshold} of {path} (nearest: {nearest:?})")]
    NoCandidateWithinThreshold {
        path: PathBuf,
        threshold: u32,
        /// Closest candidate number and its distance, if the index was not empty
        nearest: Option<(String, u32)>,
    },

    #[error("Failed to decode {path}: {reason}")]
    DecodeFailure { path: PathBuf, reason: String },
}

impl MatchFailure {
    pub fn path(&self) -> &Path {
        match self {
            MatchFailure::NoCandidateWithinThreshold { path, .. } => path,
            MatchFailure::DecodeFailure { path, .. } => path,
        }
    }
}

pub type MatchResult = Result<CardMatch, MatchFailure>;

/// Ordering key for card numbers: the numeric value of their digits, then
/// the raw text. Numbers without digits sort last.
///
/// `"TL005"` and `"005"` share the value 5; `"010"` sorts after `"9"`.
pub fn number_key(number: &str) -> (u64, &str) {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    (digits.parse().unwrap_or(u64::MAX), number)
}

pub struct Matcher {
    strategy: Box<dyn ComparisonStrategy>,
}

impl Matcher {
    pub fn new(strategy: Box<dyn ComparisonStrategy>) -> Self {
        Self { strategy }
    }

    pub fn with_threshold(threshold: u32) -> Self {
        Self::new(Box::new(ThresholdStrategy::new(threshold)))
    }

    pub fn threshold(&self) -> u32 {
        self.strategy.threshold()
    }

    pub fn description(&self) -> String {
        self.strategy.description()
    }

    /// Nearest candidate by distance, ties broken by [`number_key`].
    pub fn nearest<'a>(
        &self,
        fingerprint: &Fingerprint,
        index: &'a CandidateIndex,
    ) -> Option<(&'a IndexedCandidate, u32)> {
        index
            .entries()
            .iter()
            .map(|entry| (entry, fingerprint.distance(&entry.fingerprint)))
            .min_by(|(a, da), (b, db)| {
                da.cmp(db)
                    .then_with(|| number_key(&a.card.number).cmp(&number_key(&b.card.number)))
            })
    }

    pub fn match_image(&self, image: &LocalImage, index: &CandidateIndex) -> MatchResult {
        let nearest = self.nearest(&image.fingerprint, index);

        match nearest {
            Some((entry, distance)) if self.strategy.accepts(distance) => Ok(CardMatch {
                path: image.path.clone(),
                candidate: entry.card.clone(),
                distance,
                match_type: MatchType::from_distance(distance),
            }),
            _ => Err(MatchFailure::NoCandidateWithinThreshold {
                path: image.path.clone(),
                threshold: self.threshold(),
                nearest: nearest.map(|(entry, distance)| (entry.card.number.clone(), distance)),
            }),
        }
    }

    /// Hash `path` with `hasher`, then match it.
    pub fn match_file(&self, path: &Path, hasher: &dyn HashAlgorithm, index: &CandidateIndex) -> MatchResult {
        let image = LocalImage::load(path, hasher)?;
        self.match_image(&image, index)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_MATCH_THRESHOLD)
    }
}
