//! One publishing run: pick a sign, resolve it, post it.
//!
//! Every stage either yields a value or ends the run early. Missing data
//! is a [`Outcome::Skipped`], not an error; transport and auth failures are
//! returned as errors with the failing stage in their context.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};

use crate::catalog::CatalogSnapshot;
use crate::consts::{CATALOG_KEY, asset_key};
use crate::post;
use crate::search::{MetadataIndex, SignDocument};
use crate::social::{Credentials, SocialPlatform};
use crate::store::{Asset, BlobStore, KvStore};

/// Why a run ended without posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyCatalog,
    MissingAsset,
    MissingMetadata,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyCatalog => write!(f, "catalog is empty"),
            SkipReason::MissingAsset => write!(f, "asset not in bucket"),
            SkipReason::MissingMetadata => write!(f, "document not in search index"),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Published { sign_id: String, uri: String },
    Skipped(SkipReason),
}

/// The external services a run talks to.
pub struct Collaborators {
    pub kv: Arc<dyn KvStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub index: Arc<dyn MetadataIndex>,
    pub social: Arc<dyn SocialPlatform>,
}

/// Posts a random catalog entry. Holds no per-run state, so runs may overlap.
pub struct Publisher {
    kv: Arc<dyn KvStore>,
    blobs: Arc<dyn BlobStore>,
    index: Arc<dyn MetadataIndex>,
    social: Arc<dyn SocialPlatform>,
    credentials: Credentials,
}

impl Publisher {
    pub fn new(collaborators: Collaborators, credentials: Credentials) -> Self {
        Self {
            kv: collaborators.kv,
            blobs: collaborators.blobs,
            index: collaborators.index,
            social: collaborators.social,
            credentials,
        }
    }

    /// Run the whole workflow once.
    pub async fn run_once(&self) -> Result<Outcome> {
        let run_id = rand::random::<u32>();
        self.run_inner()
            .instrument(info_span!("publish", run = %format!("{run_id:08x}")))
            .await
    }

    async fn run_inner(&self) -> Result<Outcome> {
        let catalog = self.load_catalog().await?;
        let Some(sign_id) = catalog.pick() else {
            return Ok(skip(SkipReason::EmptyCatalog));
        };
        debug!(sign_id, candidates = catalog.images.len(), "picked sign");

        let Some(asset) = self.fetch_asset(sign_id).await? else {
            return Ok(skip(SkipReason::MissingAsset));
        };
        let Some(doc) = self.fetch_metadata(sign_id).await? else {
            return Ok(skip(SkipReason::MissingMetadata));
        };

        let uri = self.publish(sign_id, &doc, asset).await?;
        info!(sign_id, %uri, "published");
        Ok(Outcome::Published {
            sign_id: sign_id.to_string(),
            uri,
        })
    }

    async fn load_catalog(&self) -> Result<CatalogSnapshot> {
        let raw = self
            .kv
            .get(CATALOG_KEY)
            .await
            .with_context(|| format!("failed to read catalog {CATALOG_KEY}"))?;
        Ok(CatalogSnapshot::parse(raw.as_deref()))
    }

    async fn fetch_asset(&self, sign_id: &str) -> Result<Option<Asset>> {
        let key = asset_key(sign_id);
        self.blobs
            .get(&key)
            .await
            .with_context(|| format!("failed to fetch asset {key}"))
    }

    async fn fetch_metadata(&self, sign_id: &str) -> Result<Option<SignDocument>> {
        self.index
            .get_document(sign_id)
            .await
            .with_context(|| format!("failed to fetch metadata for {sign_id}"))
    }

    /// Log in, upload the image, create the post. Not transactional: a failed
    /// post leaves the uploaded blob orphaned on the platform.
    async fn publish(&self, sign_id: &str, doc: &SignDocument, asset: Asset) -> Result<String> {
        let session = self
            .social
            .login(&self.credentials)
            .await
            .context("failed to log in")?;

        let blob = self
            .social
            .upload_blob(&session, asset.bytes, &asset.content_type)
            .await
            .context("failed to upload image")?;

        let record = post::compose(sign_id, doc, blob, Utc::now());
        let receipt = self
            .social
            .create_post(&session, &record)
            .await
            .context("failed to create post")?;

        Ok(receipt.uri)
    }
}

fn skip(reason: SkipReason) -> Outcome {
    info!(%reason, "skipping run");
    Outcome::Skipped(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_reasons_display() {
        assert_eq!(SkipReason::EmptyCatalog.to_string(), "catalog is empty");
        assert_eq!(SkipReason::MissingAsset.to_string(), "asset not in bucket");
        assert_eq!(
            SkipReason::MissingMetadata.to_string(),
            "document not in search index"
        );
    }
}
