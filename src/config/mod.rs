//! Runtime settings, read from flags or the environment.
//!
//! Every option has an environment variable so the service can be deployed
//! with nothing but a `.env` file (loaded by `main` when present).

use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use crate::consts::{DEFAULT_BLUESKY_SERVICE, DEFAULT_CF_API_BASE};
use crate::publisher::{Collaborators, Publisher};
use crate::search::meilisearch::MeiliSearch;
use crate::social::Credentials;
use crate::social::bluesky::Bluesky;
use crate::store::bucket::HttpBucket;
use crate::store::cloudflare::CloudflareKv;

/// Bindings and credentials for every external service.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Bluesky handle to post as
    #[arg(long, env = "BLUESKY_HANDLE")]
    pub bluesky_handle: String,

    /// Bluesky app password
    #[arg(long, env = "BLUESKY_PASSWORD", hide_env_values = true)]
    pub bluesky_password: String,

    /// Bluesky PDS base URL
    #[arg(long, env = "BLUESKY_SERVICE", default_value = DEFAULT_BLUESKY_SERVICE)]
    pub bluesky_service: String,

    /// Meilisearch host
    #[arg(long, env = "SEARCH_HOST")]
    pub search_host: String,

    /// Meilisearch API key
    #[arg(long, env = "SEARCH_KEY", hide_env_values = true)]
    pub search_key: String,

    /// Meilisearch index holding sign metadata
    #[arg(long, env = "SEARCH_INDEX")]
    pub search_index: String,

    /// Cloudflare account owning the KV namespace
    #[arg(long, env = "CF_ACCOUNT_ID")]
    pub cf_account_id: String,

    /// Cloudflare API token with KV read access
    #[arg(long, env = "CF_API_TOKEN", hide_env_values = true)]
    pub cf_api_token: String,

    /// Cloudflare API base URL
    #[arg(long, env = "CF_API_BASE", default_value = DEFAULT_CF_API_BASE)]
    pub cf_api_base: String,

    /// KV namespace holding the catalog
    #[arg(long, env = "SIGNS_KV_NAMESPACE")]
    pub signs_kv_namespace: String,

    /// Public base URL of the sign image bucket
    #[arg(long, env = "SIGN_BUCKET_URL")]
    pub sign_bucket_url: String,
}

impl Settings {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            identifier: self.bluesky_handle.clone(),
            password: self.bluesky_password.clone(),
        }
    }

    /// Wire up the production clients. Fails on malformed service URLs.
    pub fn collaborators(&self) -> Result<Collaborators> {
        Ok(Collaborators {
            kv: Arc::new(CloudflareKv::new(
                &self.cf_api_base,
                &self.cf_account_id,
                &self.signs_kv_namespace,
                &self.cf_api_token,
            )?),
            blobs: Arc::new(HttpBucket::new(&self.sign_bucket_url)?),
            index: Arc::new(MeiliSearch::new(
                &self.search_host,
                &self.search_key,
                &self.search_index,
            )?),
            social: Arc::new(Bluesky::new(&self.bluesky_service)?),
        })
    }

    pub fn publisher(&self) -> Result<Publisher> {
        Ok(Publisher::new(self.collaborators()?, self.credentials()))
    }
}

/// Load `.env` into the environment. A missing file is not an error.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    settle_dotenv(dotenvy::dotenv().map(|_| ()))
}

/// Keep only the errors worth reporting: anything but "file not found".
pub fn settle_dotenv(result: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: Settings,
    }

    const REQUIRED: &[&str] = &[
        "test",
        "--bluesky-handle",
        "signs.bsky.social",
        "--bluesky-password",
        "app-pass",
        "--search-host",
        "https://search.example",
        "--search-key",
        "key",
        "--search-index",
        "signs",
        "--cf-account-id",
        "acct",
        "--cf-api-token",
        "tok",
        "--signs-kv-namespace",
        "ns",
        "--sign-bucket-url",
        "https://img.example",
    ];

    #[test]
    fn parses_flags_with_defaults() {
        let cli = TestCli::try_parse_from(REQUIRED).unwrap();
        let s = cli.settings;
        assert_eq!(s.bluesky_handle, "signs.bsky.social");
        assert_eq!(s.bluesky_service, DEFAULT_BLUESKY_SERVICE);
        assert_eq!(s.cf_api_base, DEFAULT_CF_API_BASE);
        assert_eq!(s.search_index, "signs");
    }

    #[test]
    fn credentials_from_settings() {
        let cli = TestCli::try_parse_from(REQUIRED).unwrap();
        let creds = cli.settings.credentials();
        assert_eq!(creds.identifier, "signs.bsky.social");
        assert_eq!(creds.password, "app-pass");
    }

    #[test]
    fn collaborators_reject_malformed_urls() {
        let mut args = REQUIRED.to_vec();
        let last = args.len() - 1;
        args[last] = "not a url";
        let cli = TestCli::try_parse_from(args).unwrap();
        let err = cli.settings.collaborators().err().unwrap();
        assert!(format!("{err:#}").contains("invalid bucket URL"));
    }

    #[test]
    fn collaborators_from_valid_settings() {
        let cli = TestCli::try_parse_from(REQUIRED).unwrap();
        assert!(cli.settings.publisher().is_ok());
    }

    #[test]
    fn missing_dotenv_is_fine() {
        let missing = dotenvy::from_filename("signpost-no-such-file.env").map(|_| ());
        assert!(settle_dotenv(missing).is_ok());
        assert!(settle_dotenv(Ok(())).is_ok());
    }

    #[test]
    fn malformed_dotenv_is_reported() {
        let malformed = Err(dotenvy::Error::LineParse("BLUESKY HANDLE".to_string(), 7));
        let err = settle_dotenv(malformed).unwrap_err();
        assert!(!err.not_found());
        assert!(err.to_string().contains("BLUESKY HANDLE"));
    }

    #[test]
    fn missing_required_option_fails() {
        // Drop the bucket URL flag and its value
        let args = &REQUIRED[..REQUIRED.len() - 2];
        if std::env::var("SIGN_BUCKET_URL").is_err() {
            assert!(TestCli::try_parse_from(args).is_err());
        }
    }
}
