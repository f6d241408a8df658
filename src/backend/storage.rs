//! Storage gateway
//!
//! Uploads image bytes to a public bucket and hands back the public URL.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use std::sync::Arc;
use uuid::Uuid;

use super::client::{execute, AuthToken, BackendClient};
use super::error::BackendError;

/// Object storage operations
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` at `bucket/path`, replacing any existing object
    async fn upload(
        &self,
        auth: &AuthToken,
        bucket: &str,
        path: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<(), BackendError>;

    /// Publicly reachable URL of an object
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

pub struct RestObjectStorage {
    client: BackendClient,
}

impl RestObjectStorage {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn ObjectStorage> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl ObjectStorage for RestObjectStorage {
    async fn upload(
        &self,
        auth: &AuthToken,
        bucket: &str,
        path: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<(), BackendError> {
        let builder = self
            .client
            .request(Method::POST, &format!("/storage/v1/object/{}/{}", bucket, path), auth)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(data);
        execute(builder).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        public_object_url(self.client.base_url(), bucket, path)
    }
}

pub fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!("{}/storage/v1/object/public/{}/{}", base_url, bucket, path)
}

/// Fresh object path `{folder}/{uuid}.{ext}`
pub fn object_path(folder: &str, extension: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{}.{}", Uuid::new_v4(), extension)
    } else {
        format!("{}/{}.{}", folder, Uuid::new_v4(), extension)
    }
}
