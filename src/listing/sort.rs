use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::Photocard;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortMode {
    #[default]
    YearAsc,
    YearDesc,
    AlbumAsc,
    AlbumDesc,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::YearAsc,
        SortMode::YearDesc,
        SortMode::AlbumAsc,
        SortMode::AlbumDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::YearAsc => "year-asc",
            SortMode::YearDesc => "year-desc",
            SortMode::AlbumAsc => "album-asc",
            SortMode::AlbumDesc => "album-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::YearAsc => "Year ↑",
            SortMode::YearDesc => "Year ↓",
            SortMode::AlbumAsc => "Album ↑",
            SortMode::AlbumDesc => "Album ↓",
        }
    }

    /// Compare two cards given their precomputed album keys.
    fn compare(self, a: (i32, &str), b: (i32, &str)) -> Ordering {
        let (year_a, key_a) = a;
        let (year_b, key_b) = b;
        match self {
            SortMode::YearAsc => year_a.cmp(&year_b).then_with(|| key_a.cmp(key_b)),
            SortMode::YearDesc => year_b.cmp(&year_a).then_with(|| key_a.cmp(key_b)),
            SortMode::AlbumAsc => key_a.cmp(key_b).then_with(|| year_a.cmp(&year_b)),
            SortMode::AlbumDesc => key_b.cmp(key_a).then_with(|| year_a.cmp(&year_b)),
        }
    }

    pub fn cmp_photocards(self, a: &Photocard, b: &Photocard) -> Ordering {
        self.compare(
            (a.year, a.album_key().as_str()),
            (b.year, b.album_key().as_str()),
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort mode '{0}' (expected year-asc, year-desc, album-asc or album-desc)")]
pub struct ParseSortModeError(String);

impl FromStr for SortMode {
    type Err = ParseSortModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ParseSortModeError(s.to_string()))
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable sort of `cards`. No explicit mode sorts by year ascending.
pub fn sort_photocards(cards: Vec<Photocard>, mode: Option<SortMode>) -> Vec<Photocard> {
    let mode = mode.unwrap_or_default();
    let mut keyed: Vec<(String, Photocard)> =
        cards.into_iter().map(|pc| (pc.album_key(), pc)).collect();
    keyed.sort_by(|(key_a, a), (key_b, b)| {
        mode.compare((a.year, key_a.as_str()), (b.year, key_b.as_str()))
    });
    keyed.into_iter().map(|(_, pc)| pc).collect()
}
