//! Comment repository

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::with_columns;
use crate::backend::{AuthToken, BackendClient, BackendError, TableQuery};
use crate::models::{Comment, CreateCommentInput};

const COMMENT_SELECT: &str = "*,author:profiles(id,full_name,avatar_url)";

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// All comments of a post, oldest first, soft-deleted ones included
    async fn list_for_post(&self, auth: &AuthToken, post_id: Uuid) -> Result<Vec<Comment>, BackendError>;

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Comment>, BackendError>;

    async fn create(&self, auth: &AuthToken, author_id: Uuid, input: &CreateCommentInput) -> Result<Comment, BackendError>;

    /// Flag as deleted; the row stays so replies keep their parent
    async fn soft_delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError>;
}

pub struct RestCommentRepository {
    client: BackendClient,
}

impl RestCommentRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl CommentRepository for RestCommentRepository {
    async fn list_for_post(&self, auth: &AuthToken, post_id: Uuid) -> Result<Vec<Comment>, BackendError> {
        let query = TableQuery::new("comments")
            .select(COMMENT_SELECT)
            .eq("post_id", post_id)
            .order("created_at", true);
        self.client.select(auth, &query).await
    }

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Comment>, BackendError> {
        let query = TableQuery::new("comments").select(COMMENT_SELECT).eq("id", id);
        self.client.select_one(auth, query).await
    }

    async fn create(&self, auth: &AuthToken, author_id: Uuid, input: &CreateCommentInput) -> Result<Comment, BackendError> {
        let body = with_columns(input, &[("author_id", json!(author_id))])?;
        self.client.insert(auth, "comments", &body).await
    }

    async fn soft_delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        let body = json!({ "is_deleted": true, "updated_at": Utc::now() });
        let _: Vec<serde_json::Value> = self
            .client
            .update(auth, &TableQuery::new("comments").eq("id", id), &body)
            .await?;
        Ok(())
    }
}
