//! Acceptance rules for a nearest-candidate distance.

use serde::{Deserialize, Serialize};

/// Distance at or below which a local scan is accepted as the candidate.
///
/// Empirical boundary between "same card, different encoding" and
/// "different card" for 64-bit aHash fingerprints. Calibrate against a
/// labelled set before changing it.
pub const DEFAULT_MATCH_THRESHOLD: u32 = 10;

/// How close a match was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance 0
    Exact,
    /// Distance 1-4
    NearExact,
    /// Distance 5 and above, within the threshold
    Similar,
}

impl MatchType {
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            _ => MatchType::Similar,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "exact"),
            MatchType::NearExact => write!(f, "near-exact"),
            MatchType::Similar => write!(f, "similar"),
        }
    }
}

/// Decides whether the nearest candidate is close enough to accept.
pub trait ComparisonStrategy: Send + Sync {
    fn accepts(&self, distance: u32) -> bool;

    fn threshold(&self) -> u32;

    fn description(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct ThresholdStrategy {
    threshold: u32,
}

impl ThresholdStrategy {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn accepts(&self, distance: u32) -> bool {
        distance <= self.threshold
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn description(&self) -> String {
        format!("accept the nearest candidate at distance <= {}", self.threshold)
    }
}
