//! # Core Module
//!
//! The card database engine. Nothing here touches the network or the
//! terminal.
//!
//! ## Modules
//! - `catalog` - Sets, packs and the rarity ladder
//! - `listing` - Candidate cards from a set's listing manifest
//! - `scanner` - Discovers local card images of a set
//! - `hasher` - Computes perceptual fingerprints
//! - `index` - Fingerprinted candidates for one pool
//! - `matcher` - Identifies a local image within an index
//! - `resolver` - Derives record attributes for a matched card
//! - `assembler` - Orchestrates a set from images to ordered records
//! - `export` - Reads and writes database files
//! - `desirability` - Carries desirability values into a rebuilt database

pub mod assembler;
pub mod catalog;
pub mod desirability;
pub mod export;
pub mod hasher;
pub mod index;
pub mod listing;
pub mod matcher;
pub mod resolver;
pub mod scanner;

// Re-export commonly used types
pub use assembler::{DatabaseAssembler, RunSummary, SetDatabase};
pub use catalog::{Catalog, SetConfig};
pub use hasher::{Fingerprint, HashAlgorithmKind};
pub use listing::CandidateCard;
pub use matcher::{MatchType, Matcher};
pub use resolver::CardRecord;
