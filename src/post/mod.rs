//! Bluesky post records and the composer that builds one per sign.
//!
//! The record types serialize to the `app.bsky.feed.post` lexicon, so a
//! [`PostRecord`] can be handed straight to `com.atproto.repo.createRecord`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::sign_url;
use crate::search::SignDocument;
use crate::social::BlobRef;

pub const POST_TYPE: &str = "app.bsky.feed.post";
pub const LINK_TYPE: &str = "app.bsky.richtext.facet#link";
pub const IMAGES_TYPE: &str = "app.bsky.embed.images";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(rename = "$type")]
    pub record_type: String,
    pub text: String,
    pub facets: Vec<Facet>,
    pub embed: ImagesEmbed,
    pub created_at: String,
}

/// Rich-text annotation over a UTF-8 byte range of the post text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<FacetFeature>,
}

/// Half-open `[byte_start, byte_end)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagesEmbed {
    #[serde(rename = "$type")]
    pub embed_type: String,
    pub images: Vec<EmbeddedImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    pub alt: String,
    pub image: BlobRef,
}

/// Post body: title, newline, description.
pub fn post_text(doc: &SignDocument) -> String {
    format!("{}\n{}", doc.title, doc.description)
}

/// Link facet covering the title, which always opens the text.
pub fn title_link(sign_id: &str, title: &str) -> Facet {
    Facet {
        index: ByteSlice {
            byte_start: 0,
            byte_end: title.len(),
        },
        features: vec![FacetFeature::Link {
            uri: sign_url(sign_id),
        }],
    }
}

/// Timestamp in the form the AppView expects (`2024-01-01T12:00:00.000Z`).
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the record for one sign with its uploaded image.
pub fn compose(
    sign_id: &str,
    doc: &SignDocument,
    image: BlobRef,
    created_at: DateTime<Utc>,
) -> PostRecord {
    PostRecord {
        record_type: POST_TYPE.to_string(),
        text: post_text(doc),
        facets: vec![title_link(sign_id, &doc.title)],
        embed: ImagesEmbed {
            embed_type: IMAGES_TYPE.to_string(),
            images: vec![EmbeddedImage {
                alt: doc.title.clone(),
                image,
            }],
        },
        created_at: timestamp(created_at),
    }
}
