//! Average Hash (aHash), the default card fingerprint.
//!
//! 1. Convert to grayscale and downscale to `hash_size` x `hash_size` (Lanczos3)
//! 2. Compute the mean brightness
//! 3. Emit one bit per pixel: 1 when the pixel is strictly brighter than the mean
//!
//! With the default size of 8 this yields the 64-bit digest the reference
//! listing was calibrated against.

use super::super::fast_resize::resize_to_grayscale;
use super::super::traits::{pack_bits, Fingerprint, HashAlgorithm, HashAlgorithmKind};
use crate::error::HashError;
use fast_image_resize::FilterType;
use image::DynamicImage;

pub struct AverageHasher {
    hash_size: u32,
}

impl AverageHasher {
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }
}

impl HashAlgorithm for AverageHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let gray = resize_to_grayscale(image, self.hash_size, self.hash_size, FilterType::Lanczos3)?;

        let total: u64 = gray.pixels().map(|p| p[0] as u64).sum();
        let count = (self.hash_size * self.hash_size) as f64;
        let mean = total as f64 / count;

        let bytes = pack_bits(gray.pixels().map(|p| p[0] as f64 > mean));
        Ok(Fingerprint::new(bytes, HashAlgorithmKind::Average))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Average
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn solid(value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(100, 140, |_, _| Rgb([value, value, value])))
    }

    fn left_half_bright() -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(100, 100, |x, _| {
            if x < 50 {
                Rgb([230, 230, 230])
            } else {
                Rgb([20, 20, 20])
            }
        }))
    }

    #[test]
    fn solid_image_hashes_to_zero() {
        let hash = AverageHasher::new(8).hash_image(&solid(128)).unwrap();
        assert!(hash.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(hash.bit_count(), 64);
    }

    #[test]
    fn bright_half_sets_leading_bits_of_each_row() {
        let hash = AverageHasher::new(8).hash_image(&left_half_bright()).unwrap();
        assert!(hash.as_bytes().iter().all(|&b| b == 0b1111_0000));
    }

    #[test]
    fn identical_pixels_give_identical_fingerprints() {
        let hasher = AverageHasher::new(8);
        let a = hasher.hash_image(&left_half_bright()).unwrap();
        let b = hasher.hash_image(&left_half_bright()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn kind_returns_average() {
        assert_eq!(AverageHasher::new(8).kind(), HashAlgorithmKind::Average);
    }
}
