pub mod bluesky;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::post::PostRecord;

/// Account credentials for the platform.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

/// An authenticated session. Created fresh for every run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub did: String,
    pub handle: String,
    pub access_jwt: String,
}

/// Platform-side reference to an uploaded blob. Kept verbatim so it can be
/// echoed back inside an embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(pub serde_json::Value);

/// Where a created post lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostReceipt {
    pub uri: String,
    pub cid: String,
}

/// A social network that accepts image posts.
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Session>;
    async fn upload_blob(&self, session: &Session, bytes: Vec<u8>, mime: &str) -> Result<BlobRef>;
    async fn create_post(&self, session: &Session, record: &PostRecord) -> Result<PostReceipt>;
}
