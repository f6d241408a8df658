//! Admin tag management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use super::{AdminListQuery, PublishBody};
use crate::api::common::{parse_optional, ListResponse};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateTagInput, Tag, TagFilter, UpdateTagInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(create_tag))
        .route("/{id}", put(update_tag).delete(delete_tag))
        .route("/{id}/publish", post(set_published))
}

async fn list_tags(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ListResponse<Tag>>, ApiError> {
    let filter = TagFilter {
        search: query.search(),
        published: parse_optional(&query.published),
    };
    let result = state
        .tag_service
        .list(user.auth(), &filter, &query.params(&state))
        .await?;
    Ok(Json(result.into()))
}

async fn create_tag(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreateTagInput>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = state.tag_service.create(user.auth(), input).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn update_tag(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTagInput>,
) -> Result<Json<Tag>, ApiError> {
    let tag = state.tag_service.update(user.auth(), id, input).await?;
    Ok(Json(tag))
}

async fn set_published(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PublishBody>,
) -> Result<Json<Tag>, ApiError> {
    let tag = state
        .tag_service
        .set_published(user.auth(), id, body.published)
        .await?;
    Ok(Json(tag))
}

async fn delete_tag(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.tag_service.delete(user.auth(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
