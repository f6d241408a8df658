//! Mentor API endpoints
//!
//! - GET /api/v1/mentors - Published mentors (search, skill, paged)
//! - GET /api/v1/mentors/{id} - Mentor profile with sub-records and stats
//! - GET /api/v1/skills - Published skills
//! - GET /api/v1/tags - Published tags

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::common::{list_params, non_blank, parse_optional, ListResponse};
use super::middleware::{ApiError, AppState};
use crate::backend::AuthToken;
use crate::models::{ListParams, Mentor, MentorDetail, MentorFilter, MentorSkill, Tag};

/// Query parameters for mentor listings
#[derive(Debug, Default, Deserialize)]
pub struct MentorListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl MentorListQuery {
    pub fn params(&self, default_per_page: u32) -> ListParams {
        list_params(self.page, self.per_page, default_per_page)
    }

    pub fn filter(&self) -> MentorFilter {
        MentorFilter {
            published: None,
            search: non_blank(&self.search),
            skill_id: parse_optional(&self.skill),
        }
    }
}

/// GET /api/v1/mentors
pub async fn list_mentors(
    State(state): State<AppState>,
    Query(query): Query<MentorListQuery>,
) -> Result<Json<ListResponse<Mentor>>, ApiError> {
    let params = query.params(state.config.ui.page_size);
    let result = state
        .mentor_service
        .list_published(&AuthToken::anonymous(), query.filter(), &params)
        .await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/mentors/{id}
pub async fn get_mentor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MentorDetail>, ApiError> {
    let detail = state
        .mentor_service
        .get_detail(&AuthToken::anonymous(), id, true)
        .await?;
    Ok(Json(detail))
}

/// GET /api/v1/skills
pub async fn list_skills(State(state): State<AppState>) -> Result<Json<Vec<MentorSkill>>, ApiError> {
    let skills = state.skill_service.list_published(&AuthToken::anonymous()).await?;
    Ok(Json(skills))
}

/// GET /api/v1/tags
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = state.tag_service.list_published(&AuthToken::anonymous()).await?;
    Ok(Json(tags))
}
