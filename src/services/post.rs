//! Post service
//!
//! Blog articles and activity news share one table, told apart by `type`.
//! Public reads only ever see published posts.

use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceError;
use super::validation::{normalize_optional, require};
use crate::backend::repositories::PostRepository;
use crate::backend::AuthToken;
use crate::models::{CreatePostInput, ListParams, PagedResult, Post, PostFilter, Profile, UpdatePostInput};

pub const MAX_TITLE_LEN: usize = 255;

/// Post service
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Published posts only, whatever the filter says
    pub async fn list_published(
        &self,
        auth: &AuthToken,
        mut filter: PostFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, ServiceError> {
        filter.published = Some(true);
        Ok(self.repo.list(auth, &filter, params).await?)
    }

    pub async fn list(
        &self,
        auth: &AuthToken,
        filter: &PostFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, ServiceError> {
        Ok(self.repo.list(auth, filter, params).await?)
    }

    /// A published post; drafts read as missing
    pub async fn get_published(&self, auth: &AuthToken, id: Uuid) -> Result<Post, ServiceError> {
        match self.repo.get(auth, id).await? {
            Some(post) if post.published => Ok(post),
            _ => Err(ServiceError::not_found("Bài viết")),
        }
    }

    pub async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Post, ServiceError> {
        self.repo
            .get(auth, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bài viết"))
    }

    pub async fn create(&self, auth: &AuthToken, author: &Profile, mut input: CreatePostInput) -> Result<Post, ServiceError> {
        validate_title(&input.title)?;
        input.title = input.title.trim().to_string();
        input.description = normalize_optional(input.description);
        input.thumbnail = normalize_optional(input.thumbnail);

        let created = self.repo.create(auth, author.id, &input).await?;
        if !input.tag_ids.is_empty() {
            self.repo.set_tags(auth, created.id, &input.tag_ids).await?;
        }
        tracing::info!("Post {} created by {}", created.id, author.id);
        self.get(auth, created.id).await
    }

    pub async fn update(&self, auth: &AuthToken, id: Uuid, mut input: UpdatePostInput) -> Result<Post, ServiceError> {
        if let Some(title) = input.title.as_deref() {
            validate_title(title)?;
            input.title = Some(title.trim().to_string());
        }

        self.repo
            .update(auth, id, &input)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bài viết"))?;
        if let Some(tag_ids) = input.tag_ids.as_deref() {
            self.repo.set_tags(auth, id, tag_ids).await?;
        }
        tracing::info!("Post {} updated", id);
        self.get(auth, id).await
    }

    pub async fn set_published(&self, auth: &AuthToken, id: Uuid, published: bool) -> Result<Post, ServiceError> {
        self.repo
            .set_published(auth, id, published)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bài viết"))?;
        tracing::info!("Post {} published={}", id, published);
        self.get(auth, id).await
    }

    pub async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), ServiceError> {
        self.get(auth, id).await?;
        self.repo.delete(auth, id).await?;
        tracing::info!("Post {} deleted", id);
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), ServiceError> {
    require("title", "tiêu đề", title)?;
    if title.trim().chars().count() > MAX_TITLE_LEN {
        return Err(ServiceError::ValidationError(format!(
            "Tiêu đề không được vượt quá {} ký tự",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockDocument, PostType, UserRole};
    use crate::testing::InMemoryStore;

    fn input(title: &str, published: bool) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            description: Some("  ".to_string()),
            thumbnail: None,
            content: BlockDocument::default(),
            post_type: PostType::Blog,
            published,
            tag_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_attaches_tags() {
        let store = InMemoryStore::new();
        let admin = store.add_user("admin@hr.vn", "secret1", UserRole::Admin);
        let tag = store.add_tag("Tuyển dụng", true);
        let service = PostService::new(store.repositories().posts);

        let mut new_post = input("  Bí quyết phỏng vấn  ", true);
        new_post.tag_ids = vec![tag.id];
        let post = service.create(&AuthToken::anonymous(), &admin, new_post).await.unwrap();

        assert_eq!(post.title, "Bí quyết phỏng vấn");
        assert_eq!(post.description, None);
        assert_eq!(post.tags.len(), 1);
        assert!(post.published_at.is_some());
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let store = InMemoryStore::new();
        let admin = store.add_user("admin@hr.vn", "secret1", UserRole::Admin);
        let service = PostService::new(store.repositories().posts);
        let err = service
            .create(&AuthToken::anonymous(), &admin, input("   ", false))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Vui lòng nhập tiêu đề");
    }

    #[tokio::test]
    async fn test_drafts_hidden_from_public() {
        let store = InMemoryStore::new();
        let admin = store.add_user("admin@hr.vn", "secret1", UserRole::Admin);
        let service = PostService::new(store.repositories().posts);
        let auth = AuthToken::anonymous();

        let draft = service.create(&auth, &admin, input("Nháp", false)).await.unwrap();
        service.create(&auth, &admin, input("Công khai", true)).await.unwrap();

        assert!(matches!(
            service.get_published(&auth, draft.id).await,
            Err(ServiceError::NotFound(_))
        ));
        let page = service
            .list_published(&auth, PostFilter::default(), &ListParams::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Công khai");

        let published = service.set_published(&auth, draft.id, true).await.unwrap();
        assert!(published.published);
    }

    #[tokio::test]
    async fn test_delete_missing_post() {
        let store = InMemoryStore::new();
        let service = PostService::new(store.repositories().posts);
        let err = service.delete(&AuthToken::anonymous(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
