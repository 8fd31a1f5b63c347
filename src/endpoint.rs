//! Request URLs built from a configured base plus path segments.
//!
//! Keys and ids are pushed as whole segments, so reserved characters
//! (`/`, `#`, `?`, `%`) are percent-encoded instead of changing the target.

use anyhow::{Context, Result, bail};
use reqwest::Url;

/// Parse a service base URL. Rejects URLs that cannot take a path.
pub fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid base URL {raw}"))?;
    if url.cannot_be_a_base() {
        bail!("{raw} cannot be used as a base URL");
    }
    Ok(url)
}

/// Append `segments` to the base path, one segment each.
pub fn join<I>(base: &Url, segments: I) -> Result<Url>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("{base} cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
