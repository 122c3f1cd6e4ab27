mod local;
mod supabase;

pub use local::LocalStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object already exists: {0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Backend(String),
}

/// Abstraction over the bucket photocard images are uploaded to.
/// Objects are never overwritten; keys are unique per upload.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<(), ObjectStoreError>;
    /// URL the object can be fetched from without credentials.
    fn public_url(&self, key: &str) -> String;
}
