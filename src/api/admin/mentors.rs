//! Admin mentor management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::{AdminListQuery, PublishBody};
use crate::api::common::{parse_optional, ListResponse};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateMentorInput, Mentor, MentorDetail, MentorFilter, UpdateMentorInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_mentors).post(create_mentor))
        .route("/{id}", get(get_mentor).put(update_mentor).delete(delete_mentor))
        .route("/{id}/publish", post(set_published))
}

async fn list_mentors(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ListResponse<Mentor>>, ApiError> {
    let filter = MentorFilter {
        published: parse_optional(&query.published),
        search: query.search(),
        skill_id: parse_optional(&query.skill),
    };
    let result = state
        .mentor_service
        .list(user.auth(), &filter, &query.params(&state))
        .await?;
    Ok(Json(result.into()))
}

async fn get_mentor(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MentorDetail>, ApiError> {
    let detail = state.mentor_service.get_detail(user.auth(), id, false).await?;
    Ok(Json(detail))
}

async fn create_mentor(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreateMentorInput>,
) -> Result<(StatusCode, Json<Mentor>), ApiError> {
    let mentor = state.mentor_service.create(user.auth(), input).await?;
    Ok((StatusCode::CREATED, Json(mentor)))
}

async fn update_mentor(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateMentorInput>,
) -> Result<Json<Mentor>, ApiError> {
    let mentor = state.mentor_service.update(user.auth(), id, input).await?;
    Ok(Json(mentor))
}

async fn set_published(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PublishBody>,
) -> Result<Json<Mentor>, ApiError> {
    let mentor = state
        .mentor_service
        .set_published(user.auth(), id, body.published)
        .await?;
    Ok(Json(mentor))
}

async fn delete_mentor(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.mentor_service.delete(user.auth(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
