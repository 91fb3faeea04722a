//! Per-set run counters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to every input of one set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub set_name: String,
    pub images_total: usize,
    /// Images identified and resolved into a record (before deduplication)
    pub matched: usize,
    /// Records in the final collections
    pub records: usize,
    pub promo_records: usize,
    pub duplicates_collapsed: usize,
    pub decode_failures: usize,
    pub no_match: usize,
    pub unknown_rarity: usize,
    pub candidates_unavailable: usize,
    pub listing_rejected: usize,
    /// Set directory entries that could not be read
    pub scan_errors: usize,
    /// Images with no candidate within threshold, for manual review
    pub manual_review: Vec<PathBuf>,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn new(set_name: &str) -> Self {
        Self {
            set_name: set_name.to_string(),
            ..Default::default()
        }
    }

    /// Images that produced no record.
    pub fn skipped(&self) -> usize {
        self.decode_failures + self.no_match + self.unknown_rarity
    }

    /// Fold another set's counters into this one.
    pub fn absorb(&mut self, other: &RunSummary) {
        self.images_total += other.images_total;
        self.matched += other.matched;
        self.records += other.records;
        self.promo_records += other.promo_records;
        self.duplicates_collapsed += other.duplicates_collapsed;
        self.decode_failures += other.decode_failures;
        self.no_match += other.no_match;
        self.unknown_rarity += other.unknown_rarity;
        self.candidates_unavailable += other.candidates_unavailable;
        self.listing_rejected += other.listing_rejected;
        self.scan_errors += other.scan_errors;
        self.manual_review.extend(other.manual_review.iter().cloned());
        self.duration_ms += other.duration_ms;
    }
}
