//! # card-db CLI
//!
//! Command-line interface for the card database builder.
//!
//! ## Usage
//! ```bash
//! card-db build --assets assets --listings listings --output-dir out
//! card-db build --set "Genetic Apex" --threshold 8 --output json
//! card-db transfer-desirability old.json new.json
//! ```

mod cli;

use tcgp_card_db::Result;

fn main() -> Result<()> {
    cli::run()
}
