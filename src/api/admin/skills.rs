//! Admin skill management
//!
//! Skills are read and written through procedures; the list arrives whole
//! and is searched and paged in the service.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use super::AdminListQuery;
use crate::api::common::ListResponse;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{MentorSkill, SkillInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_skills).post(create_skill))
        .route("/{id}", put(update_skill).delete(delete_skill))
}

async fn list_skills(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ListResponse<MentorSkill>>, ApiError> {
    let search = query.search();
    let result = state
        .skill_service
        .admin_list(user.auth(), search.as_deref(), &query.params(&state))
        .await?;
    Ok(Json(result.into()))
}

async fn create_skill(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<SkillInput>,
) -> Result<(StatusCode, Json<MentorSkill>), ApiError> {
    let skill = state.skill_service.create(user.auth(), input).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

async fn update_skill(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SkillInput>,
) -> Result<Json<MentorSkill>, ApiError> {
    let skill = state.skill_service.update(user.auth(), id, input).await?;
    Ok(Json(skill))
}

async fn delete_skill(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.skill_service.delete(user.auth(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
