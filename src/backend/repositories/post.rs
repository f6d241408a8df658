//! Post repository
//!
//! Posts embed their author profile and their tags (through `post_tags`).

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::with_columns;
use crate::backend::{AuthToken, BackendClient, BackendError, TableQuery};
use crate::models::{CreatePostInput, ListParams, PagedResult, Post, PostFilter, UpdatePostInput};

const POST_SELECT: &str = "*,author:profiles(id,full_name,avatar_url),tags(*)";

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Newest first by publication, then creation time
    async fn list(
        &self,
        auth: &AuthToken,
        filter: &PostFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, BackendError>;

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Post>, BackendError>;

    async fn create(&self, auth: &AuthToken, author_id: Uuid, input: &CreatePostInput) -> Result<Post, BackendError>;

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &UpdatePostInput) -> Result<Option<Post>, BackendError>;

    /// Toggle visibility; publishing stamps `published_at`
    async fn set_published(&self, auth: &AuthToken, id: Uuid, published: bool) -> Result<Option<Post>, BackendError>;

    async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError>;

    /// Replace the tag associations of a post
    async fn set_tags(&self, auth: &AuthToken, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), BackendError>;
}

pub struct RestPostRepository {
    client: BackendClient,
}

impl RestPostRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(client))
    }
}

fn list_query(filter: &PostFilter) -> TableQuery {
    let select = if filter.tag_id.is_some() {
        format!("{},tag_filter:post_tags!inner(tag_id)", POST_SELECT)
    } else {
        POST_SELECT.to_string()
    };
    let mut query = TableQuery::new("posts").select(&select);
    if let Some(post_type) = filter.post_type {
        query = query.eq("type", post_type);
    }
    if let Some(published) = filter.published {
        query = query.eq("published", published);
    }
    if let Some(tag_id) = filter.tag_id {
        query = query.eq("tag_filter.tag_id", tag_id);
    }
    if let Some(search) = filter.search.as_deref() {
        query = query.search_any(&["title", "description"], search);
    }
    query.order("published_at", false).order("created_at", false)
}

#[async_trait]
impl PostRepository for RestPostRepository {
    async fn list(
        &self,
        auth: &AuthToken,
        filter: &PostFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, BackendError> {
        self.client.select_paged(auth, list_query(filter), params).await
    }

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Post>, BackendError> {
        let query = TableQuery::new("posts").select(POST_SELECT).eq("id", id);
        self.client.select_one(auth, query).await
    }

    async fn create(&self, auth: &AuthToken, author_id: Uuid, input: &CreatePostInput) -> Result<Post, BackendError> {
        let published_at = if input.published { json!(Utc::now()) } else { Value::Null };
        let body = with_columns(input, &[("author_id", json!(author_id)), ("published_at", published_at)])?;
        self.client.insert(auth, "posts", &body).await
    }

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &UpdatePostInput) -> Result<Option<Post>, BackendError> {
        let body = with_columns(input, &[("updated_at", json!(Utc::now()))])?;
        let rows: Vec<Post> = self
            .client
            .update(auth, &TableQuery::new("posts").eq("id", id), &body)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn set_published(&self, auth: &AuthToken, id: Uuid, published: bool) -> Result<Option<Post>, BackendError> {
        let mut body = json!({ "published": published, "updated_at": Utc::now() });
        if published {
            body["published_at"] = json!(Utc::now());
        }
        let rows: Vec<Post> = self
            .client
            .update(auth, &TableQuery::new("posts").eq("id", id), &body)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        self.client
            .delete(auth, &TableQuery::new("posts").eq("id", id))
            .await
    }

    async fn set_tags(&self, auth: &AuthToken, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), BackendError> {
        self.client
            .delete(auth, &TableQuery::new("post_tags").eq("post_id", post_id))
            .await?;
        let rows: Vec<Value> = tag_ids
            .iter()
            .map(|tag_id| json!({ "post_id": post_id, "tag_id": tag_id }))
            .collect();
        self.client.insert_many(auth, "post_tags", &rows).await
    }
}
