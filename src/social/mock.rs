use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;

use super::{BlobRef, Credentials, PostReceipt, Session, SocialPlatform};
use crate::post::PostRecord;

/// Stage at which [`RecordingSocial`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Login,
    Upload,
    Post,
}

/// Everything a [`RecordingSocial`] has been asked to do.
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub logins: Vec<String>,
    pub uploads: Vec<(Vec<u8>, String)>,
    pub posts: Vec<PostRecord>,
}

/// A scripted platform for tests. Records calls and optionally fails one stage.
#[derive(Default)]
pub struct RecordingSocial {
    fail_at: Option<FailAt>,
    calls: Mutex<Calls>,
}

impl RecordingSocial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(stage: FailAt) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    /// Total number of calls of any kind.
    pub fn contacts(&self) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.logins.len() + calls.uploads.len() + calls.posts.len()
    }
}

#[async_trait]
impl SocialPlatform for RecordingSocial {
    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        self.calls
            .lock()
            .unwrap()
            .logins
            .push(credentials.identifier.clone());
        if self.fail_at == Some(FailAt::Login) {
            bail!("createSession failed (401): AuthenticationRequired: Invalid identifier or password");
        }
        Ok(Session {
            did: "did:plc:mock".to_string(),
            handle: credentials.identifier.clone(),
            access_jwt: "mock-jwt".to_string(),
        })
    }

    async fn upload_blob(&self, _session: &Session, bytes: Vec<u8>, mime: &str) -> Result<BlobRef> {
        let size = bytes.len();
        self.calls
            .lock()
            .unwrap()
            .uploads
            .push((bytes, mime.to_string()));
        if self.fail_at == Some(FailAt::Upload) {
            bail!("uploadBlob failed (500): InternalServerError");
        }
        Ok(BlobRef(serde_json::json!({
            "$type": "blob",
            "ref": {"$link": "bafkmock"},
            "mimeType": mime,
            "size": size,
        })))
    }

    async fn create_post(&self, session: &Session, record: &PostRecord) -> Result<PostReceipt> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.posts.push(record.clone());
            calls.posts.len()
        };
        if self.fail_at == Some(FailAt::Post) {
            bail!("createRecord failed (400): InvalidRequest");
        }
        Ok(PostReceipt {
            uri: format!("at://{}/app.bsky.feed.post/mock{n}", session.did),
            cid: format!("bafymock{n}"),
        })
    }
}
