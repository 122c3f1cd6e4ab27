use async_trait::async_trait;

use super::FilterOption;
use crate::api::{ApiClient, ApiError, PageRequest};
use crate::listing::{
    album_facets, visible, LoadMore, Page, PageSource, PagedList, PhotocardFilter, SortMode,
};
use crate::models::{album_facet_label, Group, Photocard};

/// Pages of `/photocards/by-group/{id}`.
pub struct GroupPhotocardsSource {
    api: ApiClient,
    group_id: String,
}

impl GroupPhotocardsSource {
    pub fn new(api: ApiClient, group_id: impl Into<String>) -> Self {
        Self {
            api,
            group_id: group_id.into(),
        }
    }
}

#[async_trait]
impl PageSource for GroupPhotocardsSource {
    type Item = Photocard;

    async fn fetch_page(&self, page: PageRequest) -> Result<Page<Photocard>, ApiError> {
        let resp = self.api.photocards_by_group(&self.group_id, page).await?;
        Ok(Page {
            items: resp.photocards,
            total: resp.total_photocards,
        })
    }
}

/// A group with its photocards, loaded a page at a time.
pub struct GroupPage {
    pub group: Group,
    pub filter: PhotocardFilter,
    pub sort: Option<SortMode>,
    photocards: PagedList<Photocard>,
    source: GroupPhotocardsSource,
}

impl GroupPage {
    /// Fetch the group and its first page of photocards concurrently.
    pub async fn load(api: &ApiClient, group_id: &str, page_size: u32) -> Result<Self, ApiError> {
        let (group, first) = tokio::try_join!(
            api.group(group_id),
            api.photocards_by_group(group_id, PageRequest::first(page_size)),
        )?;

        tracing::debug!(
            group_id,
            held = first.photocards.len(),
            total = first.total_photocards,
            "Loaded group page"
        );

        Ok(Self {
            group,
            filter: PhotocardFilter::default(),
            sort: None,
            photocards: PagedList::with_first_page(
                page_size,
                Page {
                    items: first.photocards,
                    total: first.total_photocards,
                },
            ),
            source: GroupPhotocardsSource::new(api.clone(), group_id),
        })
    }

    pub async fn load_more(&self) -> LoadMore {
        self.photocards.load_more(&self.source).await
    }

    pub fn photocards(&self) -> &PagedList<Photocard> {
        &self.photocards
    }

    pub fn total_photocards(&self) -> u64 {
        self.photocards.total()
    }

    pub fn has_more(&self) -> bool {
        self.photocards.has_more()
    }

    /// Held photocards after the current filter and sort.
    pub fn visible(&self) -> Vec<Photocard> {
        self.photocards
            .with_items(|cards| visible(cards, &self.filter, self.sort))
    }

    /// Albums among the loaded photocards.
    pub fn albums(&self) -> Vec<String> {
        self.photocards.with_items(album_facets)
    }

    pub fn member_options(&self) -> Vec<FilterOption> {
        std::iter::once(FilterOption::all())
            .chain(
                self.group
                    .members
                    .iter()
                    .map(|m| FilterOption::new(&m.id, &m.name)),
            )
            .collect()
    }

    pub fn album_options(&self) -> Vec<FilterOption> {
        std::iter::once(FilterOption::all())
            .chain(
                self.albums()
                    .into_iter()
                    .map(|album| {
                        let label = album_facet_label(&album).to_string();
                        FilterOption::new(album, label)
                    }),
            )
            .collect()
    }
}
