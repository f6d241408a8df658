//! Image uploads
//!
//! Checks type and size against the storage config, stores the bytes under
//! a fresh object path and returns the public URL.

use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceError;
use crate::backend::{object_path, AuthToken, ObjectStorage};
use crate::config::StorageConfig;

pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    config: StorageConfig,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, config: StorageConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Avatar stored under the owner's folder
    pub async fn upload_avatar(
        &self,
        auth: &AuthToken,
        user_id: Uuid,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, ServiceError> {
        let bucket = self.config.avatar_bucket.clone();
        self.upload(auth, &bucket, &user_id.to_string(), content_type, data)
            .await
    }

    pub async fn upload_thumbnail(
        &self,
        auth: &AuthToken,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, ServiceError> {
        let bucket = self.config.thumbnail_bucket.clone();
        self.upload(auth, &bucket, "posts", content_type, data).await
    }

    async fn upload(
        &self,
        auth: &AuthToken,
        bucket: &str,
        folder: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, ServiceError> {
        self.check(content_type, data.len() as u64)?;

        let path = object_path(folder, self.config.get_extension(content_type));
        self.storage
            .upload(auth, bucket, &path, content_type, data)
            .await
            .map_err(|e| {
                tracing::error!("Upload to {}/{} failed: {}", bucket, path, e);
                ServiceError::from(e)
            })?;
        tracing::info!("Uploaded {}/{}", bucket, path);
        Ok(self.storage.public_url(bucket, &path))
    }

    fn check(&self, content_type: &str, size: u64) -> Result<(), ServiceError> {
        if size == 0 {
            return Err(ServiceError::ValidationError("Vui lòng chọn tệp".to_string()));
        }
        if !self.config.is_type_allowed(content_type) {
            return Err(ServiceError::ValidationError(format!(
                "Định dạng tệp không được hỗ trợ: {}",
                content_type
            )));
        }
        if size > self.config.max_file_size {
            return Err(ServiceError::ValidationError(format!(
                "Tệp quá lớn. Dung lượng tối đa: {} MB",
                self.config.max_file_size / 1024 / 1024
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStorage;

    fn service() -> (UploadService, Arc<FakeStorage>) {
        let storage = Arc::new(FakeStorage::default());
        (UploadService::new(storage.clone(), StorageConfig::default()), storage)
    }

    #[tokio::test]
    async fn test_avatar_upload_returns_public_url() {
        let (service, storage) = service();
        let user_id = Uuid::new_v4();
        let url = service
            .upload_avatar(&AuthToken::anonymous(), user_id, "image/png", vec![1, 2, 3])
            .await
            .unwrap();
        assert!(url.contains(&format!("/avatars/{}/", user_id)));
        assert!(url.ends_with(".png"));
        assert_eq!(storage.object_count(), 1);
    }

    #[tokio::test]
    async fn test_rejects_type_size_and_empty() {
        let (service, storage) = service();
        let auth = AuthToken::anonymous();
        assert!(service.upload_thumbnail(&auth, "application/pdf", vec![1]).await.is_err());
        assert!(service.upload_thumbnail(&auth, "image/jpeg", vec![]).await.is_err());
        let too_big = vec![0u8; (StorageConfig::default().max_file_size + 1) as usize];
        assert!(service.upload_thumbnail(&auth, "image/jpeg", too_big).await.is_err());
        assert_eq!(storage.object_count(), 0);
    }
}
