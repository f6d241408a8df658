//! Mentor registration repository

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::with_columns;
use crate::backend::{AuthToken, BackendClient, BackendError, TableQuery};
use crate::models::{CreateRegistrationInput, ListParams, MentorRegistration, PagedResult, RegistrationStatus};

const TABLE: &str = "mentor_registrations";

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn list(
        &self,
        auth: &AuthToken,
        status: Option<RegistrationStatus>,
        params: &ListParams,
    ) -> Result<PagedResult<MentorRegistration>, BackendError>;

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<MentorRegistration>, BackendError>;

    async fn list_for_user(&self, auth: &AuthToken, user_id: Uuid) -> Result<Vec<MentorRegistration>, BackendError>;

    async fn create(
        &self,
        auth: &AuthToken,
        user_id: Uuid,
        input: &CreateRegistrationInput,
    ) -> Result<MentorRegistration, BackendError>;

    /// Approve through `admin_approve_mentor_registration`, which also
    /// creates the mentor and promotes the applicant
    async fn approve(&self, auth: &AuthToken, id: Uuid, admin_notes: Option<&str>) -> Result<(), BackendError>;

    async fn reject(
        &self,
        auth: &AuthToken,
        id: Uuid,
        admin_notes: Option<&str>,
    ) -> Result<Option<MentorRegistration>, BackendError>;
}

pub struct RestRegistrationRepository {
    client: BackendClient,
}

impl RestRegistrationRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn RegistrationRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl RegistrationRepository for RestRegistrationRepository {
    async fn list(
        &self,
        auth: &AuthToken,
        status: Option<RegistrationStatus>,
        params: &ListParams,
    ) -> Result<PagedResult<MentorRegistration>, BackendError> {
        let mut query = TableQuery::new(TABLE).select("*");
        if let Some(status) = status {
            query = query.eq("status", status);
        }
        self.client
            .select_paged(auth, query.order("created_at", false), params)
            .await
    }

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<MentorRegistration>, BackendError> {
        self.client
            .select_one(auth, TableQuery::new(TABLE).select("*").eq("id", id))
            .await
    }

    async fn list_for_user(&self, auth: &AuthToken, user_id: Uuid) -> Result<Vec<MentorRegistration>, BackendError> {
        let query = TableQuery::new(TABLE)
            .select("*")
            .eq("user_id", user_id)
            .order("created_at", false);
        self.client.select(auth, &query).await
    }

    async fn create(
        &self,
        auth: &AuthToken,
        user_id: Uuid,
        input: &CreateRegistrationInput,
    ) -> Result<MentorRegistration, BackendError> {
        let body = with_columns(
            input,
            &[("user_id", json!(user_id)), ("status", json!(RegistrationStatus::Pending))],
        )?;
        self.client.insert(auth, TABLE, &body).await
    }

    async fn approve(&self, auth: &AuthToken, id: Uuid, admin_notes: Option<&str>) -> Result<(), BackendError> {
        let _: Value = self
            .client
            .rpc(
                auth,
                "admin_approve_mentor_registration",
                &json!({ "p_registration_id": id, "p_admin_notes": admin_notes }),
            )
            .await?;
        Ok(())
    }

    async fn reject(
        &self,
        auth: &AuthToken,
        id: Uuid,
        admin_notes: Option<&str>,
    ) -> Result<Option<MentorRegistration>, BackendError> {
        let body = json!({
            "status": RegistrationStatus::Rejected,
            "admin_notes": admin_notes,
            "updated_at": Utc::now(),
        });
        let rows: Vec<MentorRegistration> = self
            .client
            .update(auth, &TableQuery::new(TABLE).eq("id", id), &body)
            .await?;
        Ok(rows.into_iter().next())
    }
}
