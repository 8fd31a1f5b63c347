//! The curated catalog of sign identifiers and random selection over it.

use rand::RngExt;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Snapshot of a catalog entry as stored in the KV namespace.
///
/// Only `images` drives selection. `imageCount` is informational, so any
/// shape of it is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSnapshot {
    #[serde(deserialize_with = "lenient_count")]
    pub image_count: u64,
    pub images: Vec<String>,
}

/// Accept `2`, `2.0` or `"2"`; anything unusable reads as 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    Ok(count)
}

impl CatalogSnapshot {
    /// Parse the raw KV value. Absent or malformed data yields an empty catalog.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.unwrap_or("{}");
        match serde_json::from_str(raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "catalog is not valid JSON, treating as empty");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Pick one identifier uniformly at random. `None` when the catalog is empty.
    pub fn pick(&self) -> Option<&str> {
        self.pick_with(&mut rand::rng())
    }

    /// Same as [`pick`](Self::pick) with a caller-supplied RNG.
    pub fn pick_with<R: RngExt>(&self, rng: &mut R) -> Option<&str> {
        if self.images.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.images.len());
        Some(self.images[index].as_str())
    }
}
