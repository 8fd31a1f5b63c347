pub mod bucket;
pub mod cloudflare;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// Binary payload fetched from the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Read side of a key-value namespace. Missing keys are `Ok(None)`.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// Read side of an object bucket. Missing objects are `Ok(None)`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Asset>>;
}
