//! Turning a local photocard submission into a catalog entry: validate the
//! images, upload them to object storage, then register the card with the API.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::auth::{AuthError, SessionStore};
use crate::models::{CreateType, Photocard, PhotocardCreatePayload, OTHER_ALBUM};
use crate::object_store::{ObjectStore, ObjectStoreError};

/// Substring the API uses when a request lacks valid credentials.
pub const AUTH_FAILURE_MARKER: &str = "Authentication required";

const AUTH_FAILURE_MESSAGE: &str = "Authentication failed. Please log in again and try again.";
const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Photo card front is required")]
    MissingFront,
    #[error("Front image must be under {}", format_size(.limit))]
    FrontTooLarge { limit: u64 },
    #[error("Back image must be under {}", format_size(.limit))]
    BackTooLarge { limit: u64 },
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] ObjectStoreError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl UploadError {
    /// Message to show the user. Authentication failures get a fixed
    /// re-login message; everything else is shown as-is.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.contains(AUTH_FAILURE_MARKER) {
            AUTH_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UploadError::MissingFront
                | UploadError::FrontTooLarge { .. }
                | UploadError::BackTooLarge { .. }
        )
    }
}

/// `5MB` for whole mebibytes, otherwise one decimal (`0.5MB`) or KB below that.
fn format_size(bytes: &u64) -> String {
    const MB: u64 = 1024 * 1024;
    let bytes = *bytes;
    if bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= MB / 10 {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else {
        format!("{}KB", bytes.div_ceil(1024))
    }
}

/// An image picked for upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub data: Bytes,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    pub async fn read<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Lowercased extension of the file name, `jpg` when there is none.
    pub fn extension(&self) -> String {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
            _ => DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "image/jpeg".to_string())
    }
}

/// Album cards carry album + version; anything else a free-text description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardKind {
    Album { album: String, version: String },
    Other { description: String },
}

#[derive(Debug, Clone)]
pub struct UploadForm {
    pub member_name: String,
    pub group_name: String,
    pub year: i32,
    pub kind: CardKind,
    pub front: Option<ImageFile>,
    pub back: Option<ImageFile>,
}

impl UploadForm {
    /// Album stored with the card; the `_other` sentinel for non-album cards.
    pub fn resolved_album(&self) -> &str {
        match &self.kind {
            CardKind::Album { album, .. } => album.as_str(),
            CardKind::Other { .. } => OTHER_ALBUM,
        }
    }

    /// Version for album cards, the description otherwise.
    pub fn resolved_version(&self) -> &str {
        match &self.kind {
            CardKind::Album { version, .. } => version.as_str(),
            CardKind::Other { description } => description.as_str(),
        }
    }

    pub fn create_type(&self) -> CreateType {
        match self.kind {
            CardKind::Album { .. } => CreateType::Album,
            CardKind::Other { .. } => CreateType::Special,
        }
    }

    /// Check the images against `max_file_size`, in order: front present,
    /// front size, back size. Returns the front image.
    pub fn validate(&self, max_file_size: u64) -> Result<&ImageFile, UploadError> {
        let front = self.front.as_ref().ok_or(UploadError::MissingFront)?;
        if front.size() > max_file_size {
            return Err(UploadError::FrontTooLarge { limit: max_file_size });
        }
        if let Some(back) = &self.back {
            if back.size() > max_file_size {
                return Err(UploadError::BackTooLarge { limit: max_file_size });
            }
        }
        Ok(front)
    }

    /// Storage key for `image`: `{group}/{album}/{member}/{uuid}.{ext}`.
    pub fn storage_path(&self, image: &ImageFile) -> String {
        storage_path(
            &self.group_name,
            self.resolved_album(),
            &self.member_name,
            &uuid::Uuid::new_v4().to_string(),
            &image.extension(),
        )
    }
}

/// Lowercase, trim, turn whitespace runs into `-`, drop anything outside `[a-z0-9-]`.
pub fn normalize_path_part(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

pub fn storage_path(group: &str, album: &str, member: &str, id: &str, ext: &str) -> String {
    format!(
        "{}/{}/{}/{id}.{ext}",
        normalize_path_part(group),
        normalize_path_part(album),
        normalize_path_part(member),
    )
}

/// Uploads photocard images and registers the resulting card.
pub struct Uploader {
    api: ApiClient,
    store: Arc<dyn ObjectStore>,
    session: Arc<SessionStore>,
    max_file_size: u64,
}

impl Uploader {
    pub fn new(
        api: ApiClient,
        store: Arc<dyn ObjectStore>,
        session: Arc<SessionStore>,
        max_file_size: u64,
    ) -> Self {
        Self {
            api,
            store,
            session,
            max_file_size,
        }
    }

    /// Validate, refresh the session, upload the front (then the back, if
    /// any), and register the card. The first failure aborts the rest;
    /// images uploaded before a failure stay in the bucket.
    pub async fn submit(&self, form: &UploadForm) -> Result<Photocard, UploadError> {
        let front = form.validate(self.max_file_size)?;

        match self.session.refresh().await {
            Ok(_) => {}
            Err(AuthError::NotSignedIn) => return Err(AuthError::NotSignedIn.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed; continuing with current token");
            }
        }

        let image_url = self.upload_image(form, front).await?;
        let back_image_url = match &form.back {
            Some(back) => Some(self.upload_image(form, back).await?),
            None => None,
        };

        let payload = PhotocardCreatePayload {
            member_name: form.member_name.clone(),
            group_name: form.group_name.clone(),
            album: form.resolved_album().to_string(),
            version: form.resolved_version().to_string(),
            year: form.year,
            kind: form.create_type(),
            image_url,
            back_image_url,
        };

        let created = self.api.create_photocard(&payload).await?;
        tracing::info!(
            photocard_id = %created.id,
            group = %created.group_name,
            member = %created.member_name,
            "Photocard submitted"
        );
        Ok(created)
    }

    async fn upload_image(
        &self,
        form: &UploadForm,
        image: &ImageFile,
    ) -> Result<String, UploadError> {
        let key = form.storage_path(image);
        self.store
            .put(&key, image.data.clone(), &image.content_type())
            .await?;
        tracing::debug!(key = %key, bytes = image.size(), "Uploaded image");
        Ok(self.store.public_url(&key))
    }
}
