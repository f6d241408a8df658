//! Admin post management

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
use crate::models::{CreatePostInput, Post, PostFilter, UpdatePostInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/{id}/publish", post(set_published))
}

async fn list_posts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ListResponse<Post>>, ApiError> {
    let filter = PostFilter {
        post_type: parse_optional(&query.post_type),
        published: parse_optional(&query.published),
        search: query.search(),
        tag_id: parse_optional(&query.tag),
    };
    let result = state
        .post_service
        .list(user.auth(), &filter, &query.params(&state))
        .await?;
    Ok(Json(result.into()))
}

async fn get_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, ApiError> {
    let post = state.post_service.get(user.auth(), id).await?;
    Ok(Json(post))
}

async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state
        .post_service
        .create(user.auth(), &user.profile, input)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<Post>, ApiError> {
    let post = state.post_service.update(user.auth(), id, input).await?;
    Ok(Json(post))
}

async fn set_published(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PublishBody>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .post_service
        .set_published(user.auth(), id, body.published)
        .await?;
    Ok(Json(post))
}

async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete(user.auth(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
