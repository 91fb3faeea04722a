//! # Hasher Module
//!
//! Computes perceptual fingerprints for card images.
//!
//! ## Supported Algorithms
//! - **aHash (Average Hash)** - default; 64-bit digest matching how the
//!   reference listings were calibrated
//! - **dHash (Difference Hash)** - brightness gradients between neighbours
//! - **pHash (Perceptual Hash)** - gradient hash from `image_hasher`
//!
//! Candidates and local scans must be hashed with the same algorithm and
//! size; distances between fingerprints of different algorithms are
//! meaningless.
//!
//! ## Example
//! ```rust,ignore
//! use tcgp_card_db::core::hasher::{HasherConfig, HashAlgorithmKind};
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::Average)
//!     .hash_size(8)
//!     .build()?;
//!
//! let fingerprint = hasher.hash_file(&path)?;
//! ```

mod algorithms;
pub mod fast_decode;
pub mod fast_resize;
mod traits;

pub use algorithms::{AverageHasher, DifferenceHasher, PerceptualHasher};
pub use traits::{Fingerprint, HashAlgorithm, HashAlgorithmKind};

use crate::error::HashError;

pub const DEFAULT_HASH_SIZE: u32 = 8;

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    hash_size: u32,
    algorithm: HashAlgorithmKind,
}

impl HasherConfig {
    pub fn new() -> Self {
        Self {
            hash_size: DEFAULT_HASH_SIZE,
            algorithm: HashAlgorithmKind::Average,
        }
    }

    /// Side of the hash grid; the fingerprint holds `size * size` bits.
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn build(self) -> Result<Box<dyn HashAlgorithm>, HashError> {
        if self.hash_size == 0 || self.hash_size > 64 {
            return Err(HashError::ComputationFailed(format!(
                "hash size {} out of range (1-64)",
                self.hash_size
            )));
        }

        Ok(match self.algorithm {
            HashAlgorithmKind::Average => Box::new(AverageHasher::new(self.hash_size)),
            HashAlgorithmKind::Difference => Box::new(DifferenceHasher::new(self.hash_size)),
            HashAlgorithmKind::Perceptual => Box::new(PerceptualHasher::new(self.hash_size)),
        })
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}
