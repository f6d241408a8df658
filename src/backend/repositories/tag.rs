//! Tag repository

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::{AuthToken, BackendClient, BackendError, TableQuery};
use crate::models::{CreateTagInput, ListParams, PagedResult, Tag, TagFilter, UpdateTagInput};

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn list(
        &self,
        auth: &AuthToken,
        filter: &TagFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Tag>, BackendError>;

    /// Published tags by name, for pickers and public filters
    async fn list_published(&self, auth: &AuthToken) -> Result<Vec<Tag>, BackendError>;

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Tag>, BackendError>;

    async fn create(&self, auth: &AuthToken, input: &CreateTagInput) -> Result<Tag, BackendError>;

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &UpdateTagInput) -> Result<Option<Tag>, BackendError>;

    async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError>;
}

pub struct RestTagRepository {
    client: BackendClient,
}

impl RestTagRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl TagRepository for RestTagRepository {
    async fn list(
        &self,
        auth: &AuthToken,
        filter: &TagFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Tag>, BackendError> {
        let mut query = TableQuery::new("tags").select("*");
        if let Some(published) = filter.published {
            query = query.eq("published", published);
        }
        if let Some(search) = filter.search.as_deref() {
            query = query.ilike("name", search);
        }
        self.client
            .select_paged(auth, query.order("created_at", false), params)
            .await
    }

    async fn list_published(&self, auth: &AuthToken) -> Result<Vec<Tag>, BackendError> {
        let query = TableQuery::new("tags")
            .select("*")
            .eq("published", true)
            .order("name", true);
        self.client.select(auth, &query).await
    }

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Tag>, BackendError> {
        self.client
            .select_one(auth, TableQuery::new("tags").select("*").eq("id", id))
            .await
    }

    async fn create(&self, auth: &AuthToken, input: &CreateTagInput) -> Result<Tag, BackendError> {
        self.client.insert(auth, "tags", input).await
    }

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &UpdateTagInput) -> Result<Option<Tag>, BackendError> {
        let rows: Vec<Tag> = self
            .client
            .update(auth, &TableQuery::new("tags").eq("id", id), input)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        self.client
            .delete(auth, &TableQuery::new("tags").eq("id", id))
            .await
    }
}
