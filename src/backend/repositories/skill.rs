//! Mentor skill repository
//!
//! Admin reads and writes go through procedures that also report how many
//! mentors use each skill; public pages read the table directly.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::single_row;
use crate::backend::{AuthToken, BackendClient, BackendError, TableQuery};
use crate::models::{MentorSkill, SkillInput};

#[async_trait]
pub trait SkillRepository: Send + Sync {
    /// Every skill with its mentor count
    async fn admin_list(&self, auth: &AuthToken) -> Result<Vec<MentorSkill>, BackendError>;

    async fn list_published(&self, auth: &AuthToken) -> Result<Vec<MentorSkill>, BackendError>;

    async fn create(&self, auth: &AuthToken, input: &SkillInput) -> Result<MentorSkill, BackendError>;

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &SkillInput) -> Result<MentorSkill, BackendError>;

    async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError>;
}

pub struct RestSkillRepository {
    client: BackendClient,
}

impl RestSkillRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn SkillRepository> {
        Arc::new(Self::new(client))
    }
}

fn skill_params(input: &SkillInput) -> Value {
    json!({
        "p_name": input.name.trim(),
        "p_description": input.description,
        "p_published": input.published,
    })
}

#[async_trait]
impl SkillRepository for RestSkillRepository {
    async fn admin_list(&self, auth: &AuthToken) -> Result<Vec<MentorSkill>, BackendError> {
        let value: Value = self
            .client
            .rpc(auth, "admin_get_mentor_skills", &json!({}))
            .await?;
        match value {
            Value::Null => Ok(Vec::new()),
            other => serde_json::from_value(other).map_err(|e| BackendError::Decode(e.to_string())),
        }
    }

    async fn list_published(&self, auth: &AuthToken) -> Result<Vec<MentorSkill>, BackendError> {
        let query = TableQuery::new("mentor_skills")
            .select("*")
            .eq("published", true)
            .order("name", true);
        self.client.select(auth, &query).await
    }

    async fn create(&self, auth: &AuthToken, input: &SkillInput) -> Result<MentorSkill, BackendError> {
        let value: Value = self
            .client
            .rpc(auth, "admin_create_mentor_skill", &skill_params(input))
            .await?;
        single_row(value)
    }

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &SkillInput) -> Result<MentorSkill, BackendError> {
        let mut params = skill_params(input);
        params["p_skill_id"] = json!(id);
        let value: Value = self
            .client
            .rpc(auth, "admin_update_mentor_skill", &params)
            .await?;
        single_row(value)
    }

    async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        self.client
            .delete(auth, &TableQuery::new("mentor_skills").eq("id", id))
            .await
    }
}
