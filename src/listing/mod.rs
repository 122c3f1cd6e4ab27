//! Client-side shaping of photocard lists: filtering, sorting, album facets
//! and incremental "load more" pagination.

mod filter;
mod paging;
mod sort;

pub use filter::{album_facets, Filter, PhotocardFilter, ALL};
pub use paging::{Generation, LoadMore, Page, PageSource, PagedList, Ticket};
pub use sort::{sort_photocards, ParseSortModeError, SortMode};

use crate::models::Photocard;

/// The cards to display: `cards` filtered, then sorted.
pub fn visible(
    cards: &[Photocard],
    filter: &PhotocardFilter,
    sort: Option<SortMode>,
) -> Vec<Photocard> {
    sort_photocards(filter.apply(cards), sort)
}
