use super::FilterOption;
use crate::api::{ApiClient, ApiError};
use crate::listing::{album_facets, Filter};
use crate::models::{album_facet_label, Member, Photocard};

/// One member and all of their photocards. Not paginated.
pub struct MemberPage {
    pub member: Member,
    pub photocards: Vec<Photocard>,
    pub album: Filter,
}

impl MemberPage {
    pub async fn load(api: &ApiClient, group_id: &str, member_id: &str) -> Result<Self, ApiError> {
        let (member, photocards) = tokio::try_join!(
            api.member(group_id, member_id),
            api.member_photocards(group_id, member_id),
        )?;

        Ok(Self {
            member,
            photocards,
            album: Filter::All,
        })
    }

    pub fn albums(&self) -> Vec<String> {
        album_facets(&self.photocards)
    }

    pub fn album_options(&self) -> Vec<FilterOption> {
        std::iter::once(FilterOption::all())
            .chain(self.albums().into_iter().map(|album| {
                let label = album_facet_label(&album).to_string();
                FilterOption::new(album, label)
            }))
            .collect()
    }

    /// Photocards of the selected album, in server order.
    pub fn visible(&self) -> Vec<Photocard> {
        self.photocards
            .iter()
            .filter(|pc| self.album.matches(&pc.album))
            .cloned()
            .collect()
    }

    pub fn photocard_count(&self) -> usize {
        self.member.photocard_count(&self.photocards)
    }
}
