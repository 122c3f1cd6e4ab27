use super::BrowseError;
use crate::api::ApiClient;
use crate::auth::{AuthUser, SessionStore};
use crate::models::{Submission, SubmissionStatus};

/// The signed-in user's submissions.
pub struct SubmissionsPage {
    pub user: AuthUser,
    pub submissions: Vec<Submission>,
}

impl SubmissionsPage {
    pub async fn load(api: &ApiClient, session: &SessionStore) -> Result<Self, BrowseError> {
        let user = session.require_user()?;
        let submissions = api.submissions().await?;
        Ok(Self { user, submissions })
    }

    pub fn count(&self, status: SubmissionStatus) -> usize {
        self.submissions
            .iter()
            .filter(|s| s.status == status)
            .count()
    }
}
