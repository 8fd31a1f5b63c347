use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

use super::KvStore;
use crate::endpoint;

/// Workers KV namespace read through the Cloudflare REST API.
pub struct CloudflareKv {
    client: reqwest::Client,
    api_base: Url,
    account_id: String,
    namespace_id: String,
    api_token: String,
}

impl CloudflareKv {
    pub fn new(
        api_base: impl Into<String>,
        account_id: impl Into<String>,
        namespace_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_base: endpoint::parse_base(&api_base.into()).context("invalid Cloudflare API base")?,
            account_id: account_id.into(),
            namespace_id: namespace_id.into(),
            api_token: api_token.into(),
        })
    }

    fn value_url(&self, key: &str) -> Result<Url> {
        endpoint::join(
            &self.api_base,
            [
                "accounts",
                self.account_id.as_str(),
                "storage",
                "kv",
                "namespaces",
                self.namespace_id.as_str(),
                "values",
                key,
            ],
        )
    }
}

#[async_trait]
impl KvStore for CloudflareKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        debug!(key, "reading KV value");
        let resp = self
            .client
            .get(self.value_url(key)?)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .context("KV request failed")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("KV read of {key} failed ({status}): {text}");
        }

        let value = resp.text().await.context("failed to read KV value")?;
        Ok(Some(value))
    }
}
