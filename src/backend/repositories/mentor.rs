//! Mentor repository
//!
//! Mentors embed their skills through `mentor_skill_links`. Work experience,
//! education and activity rows live in their own tables; aggregate rating
//! and booking counts come from the `get_mentor_stats` procedure.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::{single_row, with_columns};
use crate::backend::{AuthToken, BackendClient, BackendError, TableQuery};
use crate::models::{
    CreateMentorInput, Education, ListParams, Mentor, MentorActivity, MentorFilter, MentorStats,
    PagedResult, UpdateMentorInput, WorkExperience,
};

const MENTOR_SELECT: &str = "*,skills:mentor_skills(*)";

#[async_trait]
pub trait MentorRepository: Send + Sync {
    async fn list(
        &self,
        auth: &AuthToken,
        filter: &MentorFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Mentor>, BackendError>;

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Mentor>, BackendError>;

    async fn work_experiences(&self, auth: &AuthToken, mentor_id: Uuid) -> Result<Vec<WorkExperience>, BackendError>;

    async fn educations(&self, auth: &AuthToken, mentor_id: Uuid) -> Result<Vec<Education>, BackendError>;

    async fn activities(&self, auth: &AuthToken, mentor_id: Uuid) -> Result<Vec<MentorActivity>, BackendError>;

    async fn stats(&self, auth: &AuthToken, mentor_id: Uuid) -> Result<MentorStats, BackendError>;

    async fn create(&self, auth: &AuthToken, input: &CreateMentorInput) -> Result<Mentor, BackendError>;

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &UpdateMentorInput) -> Result<Option<Mentor>, BackendError>;

    async fn set_published(&self, auth: &AuthToken, id: Uuid, published: bool) -> Result<Option<Mentor>, BackendError>;

    async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError>;

    /// Replace the skill links of a mentor
    async fn set_skills(&self, auth: &AuthToken, mentor_id: Uuid, skill_ids: &[Uuid]) -> Result<(), BackendError>;
}

pub struct RestMentorRepository {
    client: BackendClient,
}

impl RestMentorRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn MentorRepository> {
        Arc::new(Self::new(client))
    }

    async fn patch(&self, auth: &AuthToken, id: Uuid, body: &Value) -> Result<Option<Mentor>, BackendError> {
        let rows: Vec<Mentor> = self
            .client
            .update(auth, &TableQuery::new("mentors").eq("id", id), body)
            .await?;
        Ok(rows.into_iter().next())
    }
}

fn list_query(filter: &MentorFilter) -> TableQuery {
    let select = if filter.skill_id.is_some() {
        format!("{},skill_filter:mentor_skill_links!inner(skill_id)", MENTOR_SELECT)
    } else {
        MENTOR_SELECT.to_string()
    };
    let mut query = TableQuery::new("mentors").select(&select);
    if let Some(published) = filter.published {
        query = query.eq("published", published);
    }
    if let Some(skill_id) = filter.skill_id {
        query = query.eq("skill_filter.skill_id", skill_id);
    }
    if let Some(search) = filter.search.as_deref() {
        query = query.search_any(&["full_name", "headline", "email"], search);
    }
    query.order("created_at", false)
}

fn sub_records(table: &str, mentor_id: Uuid, order_column: &str) -> TableQuery {
    TableQuery::new(table)
        .select("*")
        .eq("mentor_id", mentor_id)
        .order(order_column, false)
}

#[async_trait]
impl MentorRepository for RestMentorRepository {
    async fn list(
        &self,
        auth: &AuthToken,
        filter: &MentorFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Mentor>, BackendError> {
        self.client.select_paged(auth, list_query(filter), params).await
    }

    async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Option<Mentor>, BackendError> {
        let query = TableQuery::new("mentors").select(MENTOR_SELECT).eq("id", id);
        self.client.select_one(auth, query).await
    }

    async fn work_experiences(&self, auth: &AuthToken, mentor_id: Uuid) -> Result<Vec<WorkExperience>, BackendError> {
        self.client
            .select(auth, &sub_records("mentor_work_experiences", mentor_id, "start_date"))
            .await
    }

    async fn educations(&self, auth: &AuthToken, mentor_id: Uuid) -> Result<Vec<Education>, BackendError> {
        self.client
            .select(auth, &sub_records("mentor_educations", mentor_id, "start_date"))
            .await
    }

    async fn activities(&self, auth: &AuthToken, mentor_id: Uuid) -> Result<Vec<MentorActivity>, BackendError> {
        self.client
            .select(auth, &sub_records("mentor_activities", mentor_id, "date"))
            .await
    }

    async fn stats(&self, auth: &AuthToken, mentor_id: Uuid) -> Result<MentorStats, BackendError> {
        let value: Value = self
            .client
            .rpc(auth, "get_mentor_stats", &json!({ "p_mentor_id": mentor_id }))
            .await?;
        match single_row(value) {
            Ok(stats) => Ok(stats),
            Err(BackendError::NotFound) => Ok(MentorStats::default()),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, auth: &AuthToken, input: &CreateMentorInput) -> Result<Mentor, BackendError> {
        self.client.insert(auth, "mentors", input).await
    }

    async fn update(&self, auth: &AuthToken, id: Uuid, input: &UpdateMentorInput) -> Result<Option<Mentor>, BackendError> {
        let body = with_columns(input, &[("updated_at", json!(Utc::now()))])?;
        self.patch(auth, id, &body).await
    }

    async fn set_published(&self, auth: &AuthToken, id: Uuid, published: bool) -> Result<Option<Mentor>, BackendError> {
        self.patch(auth, id, &json!({ "published": published, "updated_at": Utc::now() }))
            .await
    }

    async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        self.client
            .delete(auth, &TableQuery::new("mentors").eq("id", id))
            .await
    }

    async fn set_skills(&self, auth: &AuthToken, mentor_id: Uuid, skill_ids: &[Uuid]) -> Result<(), BackendError> {
        self.client
            .delete(auth, &TableQuery::new("mentor_skill_links").eq("mentor_id", mentor_id))
            .await?;
        let rows: Vec<Value> = skill_ids
            .iter()
            .map(|skill_id| json!({ "mentor_id": mentor_id, "skill_id": skill_id }))
            .collect();
        self.client.insert_many(auth, "mentor_skill_links", &rows).await
    }
}
