mod client;
mod error;

pub use client::{ApiClient, PageRequest};
pub use error::ApiError;

use async_trait::async_trait;

/// Supplies the bearer token attached to API requests, if a session exists.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}
