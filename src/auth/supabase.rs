use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{AuthError, AuthProvider, AuthUser, Session};
use crate::config::AuthConfig;

/// Supabase (GoTrue) auth backend.
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

impl From<TokenResponse> for Session {
    fn from(resp: TokenResponse) -> Self {
        let expires_at = resp.expires_at.or_else(|| {
            resp.expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs)
        });
        Session {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            expires_at,
            user: resp.user,
        }
    }
}

impl SupabaseAuth {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.provider_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn auth_url(&self, path: &str) -> Result<String, AuthError> {
        if self.base_url.is_empty() || self.anon_key.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        Ok(format!("{}/auth/v1/{}", self.base_url, path))
    }

    async fn post_json(
        &self,
        url: String,
        bearer: Option<&str>,
        body: Value,
    ) -> Result<Value, AuthError> {
        let mut request = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AuthError::Rejected(provider_message(&text, status.as_u16())));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Transport(e.to_string()))
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Session, AuthError> {
        let url = self.auth_url(&format!("token?grant_type={grant_type}"))?;
        let value = self.post_json(url, None, body).await?;
        let token: TokenResponse =
            serde_json::from_value(value).map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(token.into())
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.token_grant(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        let url = self.auth_url("signup")?;
        let value = self
            .post_json(
                url,
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;

        // With email confirmation enabled the provider returns only the user.
        if value.get("access_token").is_none() {
            return Ok(None);
        }
        let token: TokenResponse =
            serde_json::from_value(value).map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(Some(token.into()))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        // Revoke this session only; other devices stay signed in.
        let url = self.auth_url("logout?scope=local")?;
        self.post_json(url, Some(&session.access_token), Value::Null)
            .await?;
        Ok(())
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        self.token_grant(
            "refresh_token",
            serde_json::json!({ "refresh_token": session.refresh_token }),
        )
        .await
    }
}

/// Pick the human-readable message out of a provider error body.
fn provider_message(body: &str, status: u16) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}
