//! # Error Module
//!
//! Error types for the card database builder.
//!
//! ## Recovery Policy
//! - **Per image / per card** errors (`HashError`, `ResolveError::UnknownRarityCode`,
//!   a missed match) are logged and the item is skipped
//! - **Configuration** errors (`ConfigError`) abort the affected set only
//! - Messages always carry the offending path, number or code

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CardDbError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Errors that occur while enumerating local card images
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while decoding and fingerprinting an image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Unsupported image format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image has a zero dimension: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Hash computation failed: {0}")]
    ComputationFailed(String),

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading the materialized online listing
#[derive(Error, Debug)]
pub enum ListingError {
    #[error("Failed to read listing {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed listing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid card URL: {url}")]
    InvalidCardUrl { url: String },

    #[error("Listed card has no number or URL (name: {name:?})")]
    MissingNumber { name: Option<String> },

    #[error("Reference image unavailable for card {number}: {reason}")]
    CandidateImageUnavailable { number: String, reason: String },
}

/// Errors raised while deriving record attributes for one card
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unknown rarity code {code:?} for card {number}")]
    UnknownRarityCode { number: String, code: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration-level errors; these abort processing of one set
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown set: {set_name}")]
    UnknownSet { set_name: String },

    #[error("No pack suffix configured for {pack} in {set_name}")]
    MissingPack { set_name: String, pack: String },

    #[error("Card number {number} in {set_name} is both pack-exclusive ({card_set}) and a base-set card")]
    NumberCollision {
        set_name: String,
        number: String,
        card_set: String,
    },

    #[error("Failed to read catalog {path}: {reason}")]
    CatalogUnreadable { path: PathBuf, reason: String },

    #[error("Invalid match threshold: {value} (must be 0-{max})")]
    InvalidThreshold { value: u32, max: u32 },
}

/// Errors that occur while writing or reading a card database file
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write database {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read database {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed database {path}: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, CardDbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_error_includes_path() {
        let error = HashError::DecodeError {
            path: PathBuf::from("/assets/Genetic Apex/broken.png"),
            reason: "invalid PNG signature".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("broken.png"));
        assert!(message.contains("invalid PNG signature"));
    }

    #[test]
    fn unknown_rarity_names_the_code() {
        let error = ResolveError::UnknownRarityCode {
            number: "042".to_string(),
            code: "XR".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("\"XR\""));
        assert!(message.contains("042"));
    }

    #[test]
    fn config_error_converts_into_top_level() {
        let error: CardDbError = ConfigError::UnknownSet {
            set_name: "Nowhere".to_string(),
        }
        .into();
        assert!(matches!(error, CardDbError::Config(_)));
        assert!(error.to_string().contains("Nowhere"));
    }
}
