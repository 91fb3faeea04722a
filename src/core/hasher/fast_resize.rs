//! SIMD-accelerated downscaling to a grayscale hash grid.
//!
//! Card scans arrive at a few hundred pixels per side and are reduced to a
//! handful of pixels, so the resize dominates hashing cost.

use crate::error::HashError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage};

/// Convert to 8-bit luma, then resize to `width` x `height` with `filter`.
///
/// Grayscale conversion happens first so the convolution runs over a single
/// channel.
pub fn resize_to_grayscale(
    image: &DynamicImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<GrayImage, HashError> {
    if width == 0 || height == 0 {
        return Err(HashError::ComputationFailed(format!(
            "invalid hash grid {}x{}",
            width, height
        )));
    }

    let gray = image.to_luma8();
    let (src_width, src_height) = gray.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(HashError::ComputationFailed(
            "source image has a zero dimension".to_string(),
        ));
    }

    let src = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
        .map_err(|e| HashError::ComputationFailed(format!("source buffer: {}", e)))?;
    let mut dst = Image::new(width, height, PixelType::U8);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(filter));
    Resizer::new()
        .resize(&src, &mut dst, &options)
        .map_err(|e| HashError::ComputationFailed(format!("resize failed: {}", e)))?;

    GrayImage::from_raw(width, height, dst.into_vec())
        .ok_or_else(|| HashError::ComputationFailed("resized buffer size mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn output_has_requested_dimensions() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(120, 168, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 40])
        }));

        let gray = resize_to_grayscale(&image, 9, 8, FilterType::Bilinear).unwrap();
        assert_eq!(gray.dimensions(), (9, 8));
    }

    #[test]
    fn solid_image_stays_solid() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |_, _| Rgb([90, 90, 90])));

        let gray = resize_to_grayscale(&image, 8, 8, FilterType::Lanczos3).unwrap();
        let first = gray.get_pixel(0, 0)[0];
        assert!(gray.pixels().all(|p| p[0] == first));
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(4, 4, |_, _| Rgb([0, 0, 0])));
        assert!(resize_to_grayscale(&image, 0, 8, FilterType::Bilinear).is_err());
    }
}
