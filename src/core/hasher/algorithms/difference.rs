//! Difference Hash (dHash).
//!
//! Downscales to `(hash_size + 1)` x `hash_size` and sets a bit wherever a
//! pixel is brighter than its right-hand neighbour.

use super::super::fast_resize::resize_to_grayscale;
use super::super::traits::{pack_bits, Fingerprint, HashAlgorithm, HashAlgorithmKind};
use crate::error::HashError;
use fast_image_resize::FilterType;
use image::DynamicImage;

pub struct DifferenceHasher {
    hash_size: u32,
}

impl DifferenceHasher {
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }
}

impl HashAlgorithm for DifferenceHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let size = self.hash_size;
        let gray = resize_to_grayscale(image, size + 1, size, FilterType::Bilinear)?;

        let gray = &gray;
        let bits = (0..size).flat_map(move |y| {
            (0..size).map(move |x| gray.get_pixel(x, y)[0] > gray.get_pixel(x + 1, y)[0])
        });

        Ok(Fingerprint::new(pack_bits(bits), HashAlgorithmKind::Difference))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Difference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn gradient(descending: bool) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(100, 100, |x, _| {
            let x = if descending { 99 - x } else { x };
            let v = (x * 255 / 99) as u8;
            Rgb([v, v, v])
        }))
    }

    #[test]
    fn opposite_gradients_are_far_apart() {
        let hasher = DifferenceHasher::new(8);
        let rising = hasher.hash_image(&gradient(false)).unwrap();
        let falling = hasher.hash_image(&gradient(true)).unwrap();
        assert!(rising.distance(&falling) > 32);
    }

    #[test]
    fn hash_size_sets_fingerprint_length() {
        let image = gradient(false);
        assert_eq!(DifferenceHasher::new(8).hash_image(&image).unwrap().as_bytes().len(), 8);
        assert_eq!(DifferenceHasher::new(16).hash_image(&image).unwrap().as_bytes().len(), 32);
    }
}
