use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Asset, BlobStore, KvStore};

/// In-memory KV namespace for tests. Counts reads.
#[derive(Default)]
pub struct MemoryKv {
    values: HashMap<String, String>,
    reads: AtomicUsize,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.values.get(key).cloned())
    }
}

/// In-memory bucket for tests. Counts reads.
#[derive(Default)]
pub struct MemoryBlobs {
    objects: HashMap<String, Asset>,
    reads: AtomicUsize,
}

impl MemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, bytes: &[u8], content_type: &str) -> Self {
        self.objects.insert(
            key.to_string(),
            Asset {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn get(&self, key: &str) -> Result<Option<Asset>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.objects.get(key).cloned())
    }
}
