pub mod meilisearch;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Searchable metadata for one sign. Extra index fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDocument {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Lookup of sign metadata by identifier.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    async fn get_document(&self, id: &str) -> Result<Option<SignDocument>>;
}
