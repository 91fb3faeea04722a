//! # Scanner Module
//!
//! Enumerates the local card images of a set.
//!
//! File names never decide which card an image is; they only route a file
//! to a pool (pack sub-directory, loose, or promo). Every list is sorted by
//! path so results never depend on filesystem ordering.

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, SetImageScanner};

use crate::error::ScanError;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Local images of one set, grouped by candidate pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetImages {
    /// Images inside a pack sub-directory, keyed by directory name
    pub packs: BTreeMap<String, Vec<PathBuf>>,
    /// Images directly in the set directory
    pub loose: Vec<PathBuf>,
    pub promo: Vec<PathBuf>,
}

impl SetImages {
    pub fn len(&self) -> usize {
        self.loose.len() + self.promo.len() + self.packs.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sort(&mut self) {
        self.loose.sort();
        self.promo.sort();
        for images in self.packs.values_mut() {
            images.sort();
        }
    }
}

#[derive(Debug)]
pub struct ScanResult {
    pub images: SetImages,
    /// Unreadable entries (non-fatal)
    pub errors: Vec<ScanError>,
}
