use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use super::{ObjectStore, ObjectStoreError};
use crate::api::TokenSource;
use crate::config::{AuthConfig, UploadConfig};

/// Supabase Storage bucket backend.
pub struct SupabaseStore {
    base_url: String,
    anon_key: String,
    bucket: String,
    client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl SupabaseStore {
    pub fn new(
        auth: &AuthConfig,
        upload: &UploadConfig,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, ObjectStoreError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        Ok(Self {
            base_url: auth.provider_url.trim_end_matches('/').to_string(),
            anon_key: auth.anon_key.clone(),
            bucket: upload.bucket.clone(),
            client,
            tokens,
        })
    }

    fn upload_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        if self.base_url.is_empty() {
            return Err(ObjectStoreError::Backend(
                "Storage not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY".to_string(),
            ));
        }

        // Without a session the anon key is the bearer; bucket policies decide.
        let token = self
            .tokens
            .access_token()
            .await
            .unwrap_or_else(|| self.anon_key.clone());

        let resp = self
            .client
            .post(self.upload_url(key))
            .bearer_auth(&token)
            .header("apikey", &self.anon_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ObjectStoreError::Backend(storage_message(&body, status.as_u16())));
        }

        tracing::debug!(bucket = %self.bucket, key, "Uploaded object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

/// Storage errors come back as `{"statusCode", "error", "message"}`.
fn storage_message(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("Storage upload failed (HTTP {status})")
            } else {
                body.to_string()
            }
        })
}
