use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use tracing::debug;

use super::{Asset, BlobStore};
use crate::consts::DEFAULT_ASSET_MIME;
use crate::endpoint;

/// Object bucket exposed over plain HTTP (public bucket or custom domain).
pub struct HttpBucket {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBucket {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: endpoint::parse_base(&base_url.into()).context("invalid bucket URL")?,
        })
    }

    /// Object keys use `/` as a folder separator; every other character is
    /// encoded within its part.
    fn object_url(&self, key: &str) -> Result<Url> {
        endpoint::join(&self.base_url, key.split('/').filter(|part| !part.is_empty()))
    }
}

#[async_trait]
impl BlobStore for HttpBucket {
    async fn get(&self, key: &str) -> Result<Option<Asset>> {
        debug!(key, "fetching object");
        let resp = self
            .client
            .get(self.object_url(key)?)
            .send()
            .await
            .context("bucket request failed")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            bail!("bucket read of {key} failed ({status})");
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_ASSET_MIME)
            .to_string();
        let bytes = resp.bytes().await.context("failed to read object body")?;

        Ok(Some(Asset {
            bytes: bytes.to_vec(),
            content_type,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_joins_without_double_slash() {
        let bucket = HttpBucket::new("https://signs.example/").unwrap();
        assert_eq!(
            bucket.object_url("abc/abc_m.jpg").unwrap().as_str(),
            "https://signs.example/abc/abc_m.jpg"
        );
        assert_eq!(
            bucket.object_url("/abc/abc_m.jpg").unwrap().as_str(),
            "https://signs.example/abc/abc_m.jpg"
        );
    }

    #[test]
    fn object_url_encodes_reserved_characters_per_part() {
        let bucket = HttpBucket::new("https://signs.example/images").unwrap();
        let url = bucket.object_url("us#42/us#42_m.jpg").unwrap();
        assert_eq!(url.path(), "/images/us%2342/us%2342_m.jpg");
        assert!(url.fragment().is_none());
    }
}
