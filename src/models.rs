use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Album value marking a photocard that does not belong to an album
/// (fansign, event, ...). For these cards `version` holds a free-text description.
pub const OTHER_ALBUM: &str = "_other";

/// Kind of photocard as stored by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotocardType {
    Album,
    Pob,
    Fansign,
    Special,
}

impl PhotocardType {
    pub fn label(self) -> &'static str {
        match self {
            PhotocardType::Album => "Album",
            PhotocardType::Pob => "POB",
            PhotocardType::Fansign => "Fansign",
            PhotocardType::Special => "Special",
        }
    }

    /// Album cards carry no type badge; every other type does.
    pub fn badge(self) -> Option<&'static str> {
        match self {
            PhotocardType::Album => None,
            other => Some(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub korean_name: String,
    pub image_url: String,
    /// Legacy field some servers still send. Use [`Member::photocard_count`] instead.
    #[serde(default, skip_serializing)]
    pub photocard_count: Option<u32>,
}

impl Member {
    /// Number of cards in `photocards` that belong to this member.
    pub fn photocard_count(&self, photocards: &[Photocard]) -> usize {
        photocards
            .iter()
            .filter(|pc| pc.member_id == self.id)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub korean_name: String,
    pub company: String,
    pub debut_year: i32,
    pub image_url: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photocard {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub group_id: String,
    pub group_name: String,
    pub album: String,
    pub version: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: PhotocardType,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image_url: Option<String>,
}

impl Photocard {
    pub fn is_other(&self) -> bool {
        self.album == OTHER_ALBUM
    }

    /// Album title to show, or `None` for non-album cards.
    pub fn album_label(&self) -> Option<&str> {
        if self.is_other() {
            None
        } else {
            Some(self.album.as_str())
        }
    }

    /// The version line; for non-album cards this is the description.
    pub fn description(&self) -> &str {
        &self.version
    }

    /// Lowercased `"{album} {version}"`, the key used by album sorting.
    pub fn album_key(&self) -> String {
        format!("{} {}", self.album, self.version).to_lowercase()
    }

    pub fn alt_text(&self) -> String {
        let subject = if self.is_other() {
            &self.version
        } else {
            &self.album
        };
        format!("{} {}", self.member_name, subject)
    }
}

/// Label for an album facet value.
pub fn album_facet_label(album: &str) -> &str {
    if album == OTHER_ALBUM {
        "Other"
    } else {
        album
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Accepted,
    Rejected,
    Pending,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// A photocard a user sent in for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub group_id: String,
    pub group_name: String,
    pub album: String,
    pub version: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: PhotocardType,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image_url: Option<String>,
    pub user_email: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photocard_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub photocards: Vec<Photocard>,
    #[serde(default)]
    pub total_photocards: Option<u64>,
}

impl SearchResult {
    /// Total matching photocards; falls back to the returned count when the
    /// server did not report a total.
    pub fn total(&self) -> u64 {
        self.total_photocards
            .unwrap_or(self.photocards.len() as u64)
    }
}

/// One page of a group's photocards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPhotocards {
    pub photocards: Vec<Photocard>,
    pub total_photocards: u64,
}

/// Photocard type accepted by the create endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateType {
    Album,
    Special,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotocardCreatePayload {
    pub member_name: String,
    pub group_name: String,
    pub album: String,
    pub version: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: CreateType,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user: UserInfo,
}
