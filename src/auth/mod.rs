//! Sign-in state for the catalog client.
//!
//! The [`SessionStore`] is the single owner of the current session. It is fed by
//! an [`AuthProvider`] (Supabase in production) and publishes every change to
//! subscribers through a [`Subscription`].

mod session;
mod supabase;

pub use session::{AuthEvent, AuthState, SessionStore, SignUpOutcome, Subscription};
pub use supabase::SupabaseAuth;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NotSignedIn,
    #[error("Auth provider not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY")]
    NotConfigured,
    /// The provider answered and refused the request; the message is the provider's.
    #[error("{0}")]
    Rejected(String),
    #[error("Auth request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which the access token expires
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

/// The external service that issues and revokes sessions.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    /// Returns `None` when the account needs email confirmation before a
    /// session is issued.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError>;
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
    async fn refresh(&self, session: &Session) -> Result<Session, AuthError>;
}
