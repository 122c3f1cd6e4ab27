use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use super::{AuthError, AuthProvider, AuthUser, Session};
use crate::api::TokenSource;

/// What caused the latest state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    Initial,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

#[derive(Debug, Clone)]
pub struct AuthState {
    pub event: AuthEvent,
    pub session: Option<Session>,
    /// Message of the last failed sign-in/sign-up, cleared by the next attempt.
    pub error: Option<String>,
}

impl AuthState {
    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            event: AuthEvent::Initial,
            session: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn,
    /// The account exists but the provider wants the email confirmed first.
    ConfirmationRequired,
}

/// Receives every auth state change until dropped or unsubscribed.
pub struct Subscription {
    rx: watch::Receiver<AuthState>,
}

impl Subscription {
    pub fn current(&self) -> AuthState {
        self.rx.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {}
}

/// Process-wide holder of the current session.
pub struct SessionStore {
    provider: Arc<dyn AuthProvider>,
    state: watch::Sender<AuthState>,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { provider, state }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.state.subscribe(),
        }
    }

    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.state.borrow().user().cloned()
    }

    /// The signed-in user, or [`AuthError::NotSignedIn`].
    pub fn require_user(&self) -> Result<AuthUser, AuthError> {
        self.user().ok_or(AuthError::NotSignedIn)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.clear_error();
        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                let user = session.user.clone();
                tracing::info!(user_id = %user.id, "Signed in");
                self.publish(AuthEvent::SignedIn, Some(session));
                Ok(user)
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        self.clear_error();
        match self.provider.sign_up(email, password).await {
            Ok(Some(session)) => {
                tracing::info!(user_id = %session.user.id, "Signed up");
                self.publish(AuthEvent::SignedIn, Some(session));
                Ok(SignUpOutcome::SignedIn)
            }
            Ok(None) => Ok(SignUpOutcome::ConfirmationRequired),
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Drop the local session. A failed revoke on the provider side is logged
    /// and otherwise ignored.
    pub async fn sign_out(&self) {
        self.clear_error();
        if let Some(session) = self.session() {
            if let Err(e) = self.provider.sign_out(&session).await {
                tracing::warn!(error = %e, "Failed to revoke session with auth provider");
            }
        }
        self.publish(AuthEvent::SignedOut, None);
    }

    /// Drop the local session without contacting the provider. Other
    /// sessions of the same account stay valid.
    pub fn forget(&self) {
        self.clear_error();
        if self.session().is_some() {
            tracing::debug!("Dropping local session");
        }
        self.publish(AuthEvent::SignedOut, None);
    }

    /// Exchange the refresh token for a fresh session.
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let session = self.session().ok_or(AuthError::NotSignedIn)?;
        let refreshed = self.provider.refresh(&session).await?;
        tracing::debug!(user_id = %refreshed.user.id, "Session refreshed");
        self.publish(AuthEvent::TokenRefreshed, Some(refreshed.clone()));
        Ok(refreshed)
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    fn record_error(&self, e: &AuthError) {
        let message = e.to_string();
        self.state.send_modify(|state| state.error = Some(message));
    }

    fn publish(&self, event: AuthEvent, session: Option<Session>) {
        self.state.send_modify(|state| {
            state.event = event;
            state.session = session;
        });
    }
}

#[async_trait]
impl TokenSource for SessionStore {
    async fn access_token(&self) -> Option<String> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }
}
