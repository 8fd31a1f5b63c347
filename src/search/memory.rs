use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{MetadataIndex, SignDocument};

/// In-memory metadata index for tests. Counts lookups.
#[derive(Default)]
pub struct MemoryIndex {
    documents: HashMap<String, SignDocument>,
    lookups: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, title: &str, description: &str) -> Self {
        self.documents.insert(
            id.to_string(),
            SignDocument {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
            },
        );
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataIndex for MemoryIndex {
    async fn get_document(&self, id: &str) -> Result<Option<SignDocument>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.get(id).cloned())
    }
}
