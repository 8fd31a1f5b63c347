use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{MetadataIndex, SignDocument};
use crate::endpoint;

/// Meilisearch client scoped to a single index.
pub struct MeiliSearch {
    client: reqwest::Client,
    host: Url,
    api_key: String,
    index: String,
}

/// Index descriptor returned by `GET /indexes/{uid}`.
#[derive(Debug, Deserialize)]
pub struct IndexInfo {
    pub uid: String,
}

/// Error body Meilisearch attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    code: String,
}

impl MeiliSearch {
    pub fn new(
        host: impl Into<String>,
        api_key: impl Into<String>,
        index: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            host: endpoint::parse_base(&host.into()).context("invalid search host")?,
            api_key: api_key.into(),
            index: index.into(),
        })
    }

    fn get(&self, segments: &[&str]) -> Result<reqwest::RequestBuilder> {
        let url = endpoint::join(&self.host, segments)?;
        Ok(self.client.get(url).bearer_auth(&self.api_key))
    }

    /// Fetch the configured index's descriptor. Fails if the index does not exist.
    pub async fn get_index(&self) -> Result<IndexInfo> {
        let resp = self
            .get(&["indexes", self.index.as_str()])?
            .send()
            .await
            .context("search request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("search index {} unavailable ({status}): {}", self.index, describe(&text));
        }

        resp.json().await.context("failed to decode index descriptor")
    }
}

#[async_trait]
impl MetadataIndex for MeiliSearch {
    async fn get_document(&self, id: &str) -> Result<Option<SignDocument>> {
        let index = self.get_index().await?;
        debug!(index = %index.uid, id, "fetching document");

        let resp = self
            .get(&["indexes", index.uid.as_str(), "documents", id])?
            .send()
            .await
            .context("search request failed")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("document {id} lookup failed ({status}): {}", describe(&text));
        }

        let mut doc: SignDocument = resp.json().await.context("failed to decode document")?;
        if doc.id.is_empty() {
            doc.id = id.to_string();
        }
        Ok(Some(doc))
    }
}

/// Render a Meilisearch error body as `code: message`, or the raw text.
fn describe(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) => format!("{}: {}", err.code, err.message),
        Err(_) => body.to_string(),
    }
}
