//! katalog - client for a photocard catalog API
//!
//! This crate provides browsing and contributing to the catalog with:
//! - A typed client for the catalog REST API (timeouts, bearer auth, error normalization)
//! - An observable session store backed by Supabase auth
//! - Client-side filtering, sorting and "load more" pagination of photocard lists
//! - Photocard submission: image upload to object storage, then registration

pub mod api;
pub mod auth;
pub mod browse;
pub mod config;
pub mod listing;
pub mod models;
pub mod object_store;
#[cfg(test)]
pub mod testutil;
pub mod upload;

use std::sync::Arc;

use api::ApiClient;
use auth::{SessionStore, SupabaseAuth};
use config::Config;
use object_store::SupabaseStore;
use upload::Uploader;

/// Shared client state
pub struct Katalog {
    pub config: Config,
    pub api: ApiClient,
    pub session: Arc<SessionStore>,
    pub uploader: Uploader,
}

impl Katalog {
    /// Wire the API client, session store and uploader for `config`.
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let provider = SupabaseAuth::new(&config.auth)?;
        let session = Arc::new(SessionStore::new(Arc::new(provider)));

        let api = ApiClient::new(&config.api)?.with_tokens(session.clone());

        let store = SupabaseStore::new(&config.auth, &config.upload, session.clone())?;
        let uploader = Uploader::new(
            api.clone(),
            Arc::new(store),
            Arc::clone(&session),
            config.upload.max_file_size,
        );

        Ok(Self {
            config,
            api,
            session,
            uploader,
        })
    }
}
