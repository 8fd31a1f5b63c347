use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BlobRef, Credentials, PostReceipt, Session, SocialPlatform};
use crate::endpoint;
use crate::post::{POST_TYPE, PostRecord};

const CREATE_SESSION: &str = "com.atproto.server.createSession";
const UPLOAD_BLOB: &str = "com.atproto.repo.uploadBlob";
const CREATE_RECORD: &str = "com.atproto.repo.createRecord";

/// XRPC client for a Bluesky PDS.
pub struct Bluesky {
    client: reqwest::Client,
    service: Url,
}

impl Bluesky {
    pub fn new(service: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            service: endpoint::parse_base(&service.into()).context("invalid Bluesky service")?,
        })
    }

    fn xrpc(&self, method: &str) -> Result<Url> {
        endpoint::join(&self.service, ["xrpc", method])
    }
}

#[async_trait]
impl SocialPlatform for Bluesky {
    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let body = serde_json::json!({
            "identifier": credentials.identifier,
            "password": credentials.password,
        });

        let resp = self
            .client
            .post(self.xrpc(CREATE_SESSION)?)
            .json(&body)
            .send()
            .await
            .context("createSession request failed")?;
        let resp = check(CREATE_SESSION, resp).await?;

        let session: Session = resp.json().await.context("failed to decode session")?;
        debug!(did = %session.did, handle = %session.handle, "logged in");
        Ok(session)
    }

    async fn upload_blob(&self, session: &Session, bytes: Vec<u8>, mime: &str) -> Result<BlobRef> {
        let size = bytes.len();
        let resp = self
            .client
            .post(self.xrpc(UPLOAD_BLOB)?)
            .bearer_auth(&session.access_jwt)
            .header(CONTENT_TYPE, mime)
            .body(bytes)
            .send()
            .await
            .context("uploadBlob request failed")?;
        let resp = check(UPLOAD_BLOB, resp).await?;

        let data: UploadBlobResponse = resp.json().await.context("failed to decode blob ref")?;
        debug!(size, mime, "uploaded blob");
        Ok(data.blob)
    }

    async fn create_post(&self, session: &Session, record: &PostRecord) -> Result<PostReceipt> {
        let body = CreateRecordRequest {
            repo: &session.did,
            collection: POST_TYPE,
            record,
        };

        let resp = self
            .client
            .post(self.xrpc(CREATE_RECORD)?)
            .bearer_auth(&session.access_jwt)
            .json(&body)
            .send()
            .await
            .context("createRecord request failed")?;
        let resp = check(CREATE_RECORD, resp).await?;

        resp.json().await.context("failed to decode post receipt")
    }
}

/// Turn a non-success XRPC response into an error naming the method.
async fn check(method: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<XrpcError>(&text) {
        Ok(err) => bail!(
            "{method} failed ({status}): {}: {}",
            err.error,
            err.message.unwrap_or_default()
        ),
        Err(_) => bail!("{method} failed ({status}): {text}"),
    }
}

// --- XRPC types ---

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'a str,
    record: &'a PostRecord,
}

#[derive(Deserialize)]
struct UploadBlobResponse {
    blob: BlobRef,
}

#[derive(Deserialize)]
struct XrpcError {
    error: String,
    message: Option<String>,
}
