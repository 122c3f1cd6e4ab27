//! Page-level loaders: each type fetches what one catalog screen needs and
//! exposes the filtered, sorted and paginated views of it.

mod group;
mod member;
mod search;
mod submissions;

pub use group::{GroupPage, GroupPhotocardsSource};
pub use member::MemberPage;
pub use search::{SearchOutcome, SearchSession, SearchSource};
pub use submissions::SubmissionsPage;

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// A `(value, label)` pair for a filter menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    fn all() -> Self {
        Self::new(crate::listing::ALL, "All")
    }
}
