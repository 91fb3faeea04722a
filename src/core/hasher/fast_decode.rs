//! Image decoding for card scans and reference images.
//!
//! JPEG goes through zune-jpeg; PNG, WebP and anything else the `image`
//! crate can sniff fall back to `image::open`.

use crate::error::HashError;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFormat {
    Jpeg,
    Other,
}

impl DecodeFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg") => Self::Jpeg,
            _ => Self::Other,
        }
    }
}

pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image file, rejecting images with a zero dimension.
    pub fn decode(path: &Path) -> Result<DynamicImage, HashError> {
        let image = match DecodeFormat::from_path(path) {
            DecodeFormat::Jpeg => Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path))?,
            DecodeFormat::Other => Self::decode_fallback(path)?,
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(HashError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        Ok(image)
    }

    fn decode_jpeg(path: &Path) -> Result<DynamicImage, HashError> {
        let bytes = fs::read(path).map_err(|e| HashError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(&bytes, options);

        let pixels = decoder.decode().map_err(|e| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: "missing JPEG header info".to_string(),
        })?;
        let (width, height) = (info.width as u32, info.height as u32);

        let buffer_error = || HashError::DecodeError {
            path: path.to_path_buf(),
            reason: "decoded buffer does not match image dimensions".to_string(),
        };

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, pixels).ok_or_else(buffer_error)?)
            }
            ColorSpace::RGBA => {
                DynamicImage::ImageRgba8(RgbaImage::from_raw(width, height, pixels).ok_or_else(buffer_error)?)
            }
            ColorSpace::Luma => {
                DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, pixels).ok_or_else(buffer_error)?)
            }
            _ => return Self::decode_fallback(path),
        };

        Ok(image)
    }

    fn decode_fallback(path: &Path) -> Result<DynamicImage, HashError> {
        let reader = image::ImageReader::open(path)
            .map_err(|e| HashError::IoError {
                path: path.to_path_buf(),
                source: e,
            })?
            .with_guessed_format()
            .map_err(|e| HashError::IoError {
                path: path.to_path_buf(),
                source: e,
            })?;

        if reader.format().is_none() {
            return Err(HashError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        reader.decode().map_err(|e| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
