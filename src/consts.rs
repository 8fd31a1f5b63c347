//! Project-wide constants.

/// Where `GET /` sends visitors.
pub const REDIRECT_URL: &str = "https://roadsign.pictures";

/// KV key holding the curated catalog.
pub const CATALOG_KEY: &str = "quality";

/// Default Bluesky PDS when none is configured.
pub const DEFAULT_BLUESKY_SERVICE: &str = "https://bsky.social";

/// Default Cloudflare API root for the KV REST binding.
pub const DEFAULT_CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default interval between scheduled posts.
pub const DEFAULT_INTERVAL_SECS: u64 = 60 * 60;

/// Content type assumed for assets when the bucket does not report one.
pub const DEFAULT_ASSET_MIME: &str = "image/jpeg";

/// Canonical detail page for a sign.
pub fn sign_url(sign_id: &str) -> String {
    format!("{REDIRECT_URL}/sign/{sign_id}")
}

/// Bucket key of the medium-size rendition of a sign.
pub fn asset_key(sign_id: &str) -> String {
    format!("{sign_id}/{sign_id}_m.jpg")
}
