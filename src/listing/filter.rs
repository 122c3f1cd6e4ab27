use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::models::Photocard;

/// Filter value meaning "no constraint".
pub const ALL: &str = "all";

/// A single filter axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Only(String),
}

impl Filter {
    pub fn parse(value: &str) -> Self {
        if value == ALL {
            Filter::All
        } else {
            Filter::Only(value.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == value,
        }
    }
}

impl FromStr for Filter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Filter::parse(s))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str(ALL),
            Filter::Only(value) => f.write_str(value),
        }
    }
}

/// Member and album filters; both must pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotocardFilter {
    /// Compared against `Photocard::member_id`
    pub member: Filter,
    /// Compared against `Photocard::album`
    pub album: Filter,
}

impl PhotocardFilter {
    pub fn matches(&self, pc: &Photocard) -> bool {
        self.member.matches(&pc.member_id) && self.album.matches(&pc.album)
    }

    pub fn apply(&self, cards: &[Photocard]) -> Vec<Photocard> {
        cards.iter().filter(|pc| self.matches(pc)).cloned().collect()
    }
}

/// Distinct album values among `cards`, in first-seen order.
///
/// Only reflects what is currently loaded, so the options grow as more pages arrive.
pub fn album_facets(cards: &[Photocard]) -> Vec<String> {
    let mut seen = HashSet::new();
    cards
        .iter()
        .filter(|pc| seen.insert(pc.album.as_str()))
        .map(|pc| pc.album.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ids, photocard};

    fn cards() -> Vec<Photocard> {
        vec![
            photocard("1", "Karina", "Drama", "Giant", 2023),
            photocard("2", "Winter", "Drama", "Scene", 2023),
            photocard("3", "Karina", "_other", "Fansign", 2024),
            photocard("4", "Winter", "Armageddon", "Superbeing", 2024),
            photocard("5", "Karina", "Armageddon", "Superbeing", 2024),
        ]
    }

    #[test]
    fn test_all_keeps_everything() {
        let cards = cards();
        assert_eq!(PhotocardFilter::default().apply(&cards), cards);

        let filter = PhotocardFilter {
            member: Filter::parse("all"),
            album: Filter::parse("all"),
        };
        assert_eq!(filter.apply(&cards).len(), cards.len());
    }

    #[test]
    fn test_member_and_album_combine_with_and() {
        let cards = cards();
        let filter = PhotocardFilter {
            member: Filter::parse("karina"),
            album: Filter::All,
        };
        assert_eq!(ids(&filter.apply(&cards)), ["1", "3", "5"]);

        let filter = PhotocardFilter {
            member: Filter::parse("karina"),
            album: Filter::parse("Armageddon"),
        };
        assert_eq!(ids(&filter.apply(&cards)), ["5"]);

        let filter = PhotocardFilter {
            member: Filter::All,
            album: Filter::parse("Drama"),
        };
        assert_eq!(ids(&filter.apply(&cards)), ["1", "2"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let cards = cards();
        let filter = PhotocardFilter {
            member: Filter::parse("winter"),
            album: Filter::parse("Drama"),
        };
        let once = filter.apply(&cards);
        assert_eq!(filter.apply(&once), once);
    }

    #[test]
    fn test_album_match_is_exact() {
        let filter = PhotocardFilter {
            member: Filter::All,
            album: Filter::parse("drama"),
        };
        assert!(filter.apply(&cards()).is_empty());
    }

    #[test]
    fn test_album_facets_first_seen_order() {
        assert_eq!(
            album_facets(&cards()),
            ["Drama", "_other", "Armageddon"]
        );
        assert!(album_facets(&[]).is_empty());
    }

    #[test]
    fn test_filter_display_round_trip() {
        assert_eq!(Filter::All.to_string(), "all");
        assert_eq!("karina".parse::<Filter>().unwrap(), Filter::Only("karina".into()));
    }
}
