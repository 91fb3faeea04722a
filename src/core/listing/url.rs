//! Card page URL parsing.
//!
//! Listing scrapes often carry only the card page link, e.g.
//! `https://www.pokemon-zone.com/cards/a1/005/bulbasaur/`; number and
//! display name are recovered from its path.

use crate::core::catalog::capitalize;
use crate::error::ListingError;
use regex::Regex;
use std::sync::OnceLock;

fn card_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/cards/(?P<expansion>[^/?#]+)/(?P<number>[^/?#]+)/(?P<slug>[^/?#]+)")
            .expect("card path pattern is a valid regex")
    })
}

/// Number and name parsed from a card page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardUrl {
    pub expansion: String,
    pub number: String,
    pub name: String,
}

impl CardUrl {
    pub fn parse(url: &str) -> Result<Self, ListingError> {
        let captures = card_path_pattern()
            .captures(url)
            .ok_or_else(|| ListingError::InvalidCardUrl {
                url: url.to_string(),
            })?;

        Ok(Self {
            expansion: captures["expansion"].to_string(),
            number: captures["number"].to_string(),
            name: slug_to_card_name(&captures["slug"]),
        })
    }
}

/// `mega-charizard-ex` → `Mega Charizard EX`.
pub fn slug_to_card_name(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            if part == "ex" {
                "EX".to_string()
            } else {
                capitalize(part)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
