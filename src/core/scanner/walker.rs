//! Set directory walking using walkdir.

use super::filter::{is_hidden, ImageFilter};
use super::{ScanResult, SetImages};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    /// Files whose name contains this marker go to the promo pool
    pub promo_marker: Option<String>,
    /// Custom extensions to include (None = png, jpg, jpeg, webp)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            follow_symlinks: false,
            promo_marker: Some("_90_".to_string()),
            extensions: None,
        }
    }
}

/// Enumerates the local images of one set directory.
///
/// ```text
/// assets/Genetic Apex/
/// ├── cPK_10_000050_00_PIKACHU_C.png     loose: matched against every pack
/// ├── pikachu-pack/*.png                 matched against pikachu-pack only
/// └── cPK_90_000010_00_POTION_C.png      promo pool (name contains `_90_`)
/// ```
///
/// Only the set directory and its immediate sub-directories are read.
pub struct SetImageScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl SetImageScanner {
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);
        if let Some(extensions) = &config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }
        Self { config, filter }
    }

    pub fn scan(&self, set_dir: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(set_dir, &null_sender())
    }

    pub fn scan_with_events(&self, set_dir: &Path, events: &EventSender) -> Result<ScanResult, ScanError> {
        if !set_dir.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: set_dir.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            set_dir: set_dir.to_path_buf(),
        }));

        let mut images = SetImages::default();
        let mut errors = Vec::new();

        let walker = WalkDir::new(set_dir)
            .min_depth(1)
            .max_depth(2)
            .follow_links(self.config.follow_symlinks)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || self.config.include_hidden || !is_hidden(entry.path())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let error = if e.io_error().map(|io| io.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };
                    warn!(path = %path.display(), error = %error, "Skipping unreadable entry");
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                    continue;
                }
            };

            if entry.file_type().is_dir() || !self.filter.should_include(entry.path()) {
                continue;
            }

            let path = entry.path().to_path_buf();
            events.send(Event::Scan(ScanEvent::ImageFound { path: path.clone() }));

            if self.is_promo(&path) {
                images.promo.push(path);
            } else if entry.depth() == 1 {
                images.loose.push(path);
            } else {
                let pack = pack_dir_name(set_dir, &path);
                images.packs.entry(pack).or_default().push(path);
            }
        }

        images.sort();
        debug!(
            set_dir = %set_dir.display(),
            loose = images.loose.len(),
            packs = images.packs.len(),
            promo = images.promo.len(),
            "Set directory scanned"
        );
        events.send(Event::Scan(ScanEvent::Completed {
            total_images: images.len(),
        }));

        Ok(ScanResult { images, errors })
    }

    fn is_promo(&self, path: &Path) -> bool {
        let Some(marker) = &self.config.promo_marker else {
            return false;
        };
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.contains(marker.as_str()))
    }
}

impl Default for SetImageScanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

fn pack_dir_name(set_dir: &Path, image: &Path) -> String {
    image
        .strip_prefix(set_dir)
        .ok()
        .and_then(|relative| relative.components().next())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = SetImageScanner::default().scan(Path::new("/nonexistent/assets/Genetic Apex"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn routes_images_to_loose_pack_and_promo_pools() {
        let temp = TempDir::new().unwrap();
        let pack = temp.path().join("pikachu-pack");
        fs::create_dir(&pack).unwrap();

        touch(temp.path(), "cPK_10_000050_00_PIKACHU_C.png");
        touch(temp.path(), "cPK_90_000010_00_POTION_C.png");
        touch(&pack, "b.png");
        touch(&pack, "a.jpg");
        touch(temp.path(), "readme.txt");
        touch(temp.path(), ".hidden.png");

        let result = SetImageScanner::default().scan(temp.path()).unwrap();
        let images = result.images;

        assert_eq!(images.loose.len(), 1);
        assert_eq!(images.promo.len(), 1);
        assert_eq!(images.packs["pikachu-pack"].len(), 2);
        assert!(images.packs["pikachu-pack"][0].ends_with("a.jpg"));
        assert_eq!(images.len(), 4);
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let temp = TempDir::new().unwrap();
        let hidden = temp.path().join(".trash");
        fs::create_dir(&hidden).unwrap();
        touch(&hidden, "card.png");

        let result = SetImageScanner::default().scan(temp.path()).unwrap();
        assert!(result.images.is_empty());
    }

    #[test]
    fn promo_marker_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "cPK_90_000010_00_POTION_C.png");

        let config = ScanConfig {
            promo_marker: None,
            ..Default::default()
        };
        let result = SetImageScanner::new(config).scan(temp.path()).unwrap();
        assert_eq!(result.images.loose.len(), 1);
        assert!(result.images.promo.is_empty());
    }
}
