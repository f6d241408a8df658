//! Tag service
//!
//! Tags classify posts; unpublished tags stay out of public filters.

use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceError;
use super::validation::{normalize_optional, require};
use crate::backend::repositories::TagRepository;
use crate::backend::{AuthToken, BackendError};
use crate::models::{CreateTagInput, ListParams, PagedResult, Tag, TagFilter, UpdateTagInput};

/// Error message for a tag name that is already taken
const DUPLICATE_TAG: &str = "Thẻ đã tồn tại";

/// Tag service for managing post tags
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        auth: &AuthToken,
        filter: &TagFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Tag>, ServiceError> {
        Ok(self.repo.list(auth, filter, params).await?)
    }

    /// Published tags ordered by name
    pub async fn list_published(&self, auth: &AuthToken) -> Result<Vec<Tag>, ServiceError> {
        Ok(self.repo.list_published(auth).await?)
    }

    /// Create a new tag
    ///
    /// # Errors
    /// - `ValidationError` if the name is blank
    /// - `Conflict` if the name is already used
    pub async fn create(&self, auth: &AuthToken, mut input: CreateTagInput) -> Result<Tag, ServiceError> {
        require("name", "tên thẻ", &input.name)?;
        input.name = input.name.trim().to_string();
        input.description = normalize_optional(input.description);

        let tag = self.repo.create(auth, &input).await.map_err(duplicate_tag)?;
        tracing::info!("Tag {} created", tag.id);
        Ok(tag)
    }

    pub async fn update(&self, auth: &AuthToken, id: Uuid, mut input: UpdateTagInput) -> Result<Tag, ServiceError> {
        if let Some(name) = input.name.as_deref() {
            require("name", "tên thẻ", name)?;
            input.name = Some(name.trim().to_string());
        }
        self.repo
            .update(auth, id, &input)
            .await
            .map_err(duplicate_tag)?
            .ok_or_else(|| ServiceError::not_found("Thẻ"))
    }

    pub async fn set_published(&self, auth: &AuthToken, id: Uuid, published: bool) -> Result<Tag, ServiceError> {
        let input = UpdateTagInput {
            published: Some(published),
            ..Default::default()
        };
        self.update(auth, id, input).await
    }

    /// Delete a tag; its post associations go with it
    pub async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), ServiceError> {
        self.repo
            .get(auth, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Thẻ"))?;
        self.repo.delete(auth, id).await?;
        tracing::info!("Tag {} deleted", id);
        Ok(())
    }
}

fn duplicate_tag(err: BackendError) -> ServiceError {
    if err.is_conflict() {
        ServiceError::Conflict(DUPLICATE_TAG.to_string())
    } else {
        err.into()
    }
}
