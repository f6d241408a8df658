//! Profile repository
//!
//! `profiles` mirrors auth users one-to-one and carries the role column
//! that gates the admin area.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::with_columns;
use crate::backend::{AuthToken, BackendClient, BackendError, TableQuery};
use crate::models::{ListParams, PagedResult, Profile, ProfileFilter, UpdateProfileInput, UserRole};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Profile>, BackendError>;

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &UpdateProfileInput) -> Result<Option<Profile>, BackendError>;

    async fn list(
        &self,
        auth: &AuthToken,
        filter: &ProfileFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Profile>, BackendError>;

    async fn set_role(&self, auth: &AuthToken, id: Uuid, role: UserRole) -> Result<Option<Profile>, BackendError>;
}

pub struct RestProfileRepository {
    client: BackendClient,
}

impl RestProfileRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn ProfileRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl ProfileRepository for RestProfileRepository {
    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Profile>, BackendError> {
        self.client
            .select_one(auth, TableQuery::new("profiles").select("*").eq("id", id))
            .await
    }

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &UpdateProfileInput) -> Result<Option<Profile>, BackendError> {
        let body = with_columns(input, &[("updated_at", json!(Utc::now()))])?;
        let rows: Vec<Profile> = self
            .client
            .update(auth, &TableQuery::new("profiles").eq("id", id), &body)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list(
        &self,
        auth: &AuthToken,
        filter: &ProfileFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Profile>, BackendError> {
        let mut query = TableQuery::new("profiles").select("*");
        if let Some(role) = filter.role {
            query = query.eq("role", role);
        }
        if let Some(search) = filter.search.as_deref() {
            query = query.search_any(&["full_name", "email", "phone"], search);
        }
        self.client
            .select_paged(auth, query.order("created_at", false), params)
            .await
    }

    async fn set_role(&self, auth: &AuthToken, id: Uuid, role: UserRole) -> Result<Option<Profile>, BackendError> {
        let rows: Vec<Profile> = self
            .client
            .update(
                auth,
                &TableQuery::new("profiles").eq("id", id),
                &json!({ "role": role, "updated_at": Utc::now() }),
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}
