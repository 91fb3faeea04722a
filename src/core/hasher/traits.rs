//! Fingerprint type and the hashing algorithm trait.

use super::fast_decode::FastDecoder;
use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithmKind {
    /// Average Hash (aHash), bit set where a pixel is brighter than the mean
    Average,
    /// Difference Hash (dHash), bit set where a pixel is brighter than its right neighbour
    Difference,
    /// Double-gradient hash computed by `image_hasher`: horizontal and
    /// vertical brightness gradients of a downscaled image
    Perceptual,
}

impl HashAlgorithmKind {
    pub fn description(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Average => "Average Hash (aHash) - brightness relative to the mean",
            HashAlgorithmKind::Difference => "Difference Hash (dHash) - horizontal brightness gradients",
            HashAlgorithmKind::Perceptual => "Double-gradient Hash - horizontal and vertical brightness gradients",
        }
    }
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithmKind::Average => write!(f, "aHash"),
            HashAlgorithmKind::Difference => write!(f, "dHash"),
            HashAlgorithmKind::Perceptual => write!(f, "pHash"),
        }
    }
}

/// Trait for hash algorithm implementations
pub trait HashAlgorithm: Send + Sync {
    /// Compute a fingerprint from an already-decoded image.
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError>;

    /// Decode a file and fingerprint it.
    ///
    /// The path only locates the bytes; it never influences the result.
    fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let image = FastDecoder::decode(path)?;
        self.hash_image(&image)
    }

    fn kind(&self) -> HashAlgorithmKind;
}

/// Fixed-length perceptual digest of an image.
///
/// Not a cryptographic hash: similar images produce fingerprints a small
/// Hamming distance apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    bytes: Vec<u8>,
    algorithm: HashAlgorithmKind,
}

impl Fingerprint {
    pub fn new(bytes: Vec<u8>, algorithm: HashAlgorithmKind) -> Self {
        Self { bytes, algorithm }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bit_count(&self) -> u32 {
        (self.bytes.len() * 8) as u32
    }

    /// Hamming distance: the number of differing bits.
    ///
    /// Bytes present in only one of the two fingerprints count as fully
    /// differing, so the result is symmetric for any pair.
    pub fn distance(&self, other: &Self) -> u32 {
        let common: u32 = self
            .bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        let surplus = self.bytes.len().abs_diff(other.bytes.len()) as u32 * 8;
        common + surplus
    }
}

/// Pack a row-major sequence of bits into bytes, most significant bit first.
pub(crate) fn pack_bits(bits: impl IntoIterator<Item = bool>) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut current: u8 = 0;
    let mut position = 0;

    for bit in bits {
        if bit {
            current |= 1 << (7 - position);
        }
        position += 1;
        if position == 8 {
            bytes.push(current);
            current = 0;
            position = 0;
        }
    }

    if position > 0 {
        bytes.push(current);
    }

    bytes
}
