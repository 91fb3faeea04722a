//! # TCGP Card Database
//!
//! Builds the card metadata database of a trading card game by matching
//! local card images against the cards listed online for each set.
//!
//! Each local image is fingerprinted with a perceptual hash and compared
//! against the fingerprints of every listed card's reference image; the
//! closest one within the threshold identifies it. Identified cards get
//! their set code, rarity rank and tradability derived from the catalog.
//!
//! ## Architecture
//! - `core` - The matching and assembly engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{CardDbError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` over
/// `info`. This should be called once by the application entry point.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
