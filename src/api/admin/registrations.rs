//! Admin review of mentor applications

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::{AdminListQuery, NotesBody};
use crate::api::common::{parse_optional, ListResponse};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::MentorRegistration;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_registrations))
        .route("/{id}", get(get_registration))
        .route("/{id}/approve", post(approve))
        .route("/{id}/reject", post(reject))
}

async fn list_registrations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ListResponse<MentorRegistration>>, ApiError> {
    let result = state
        .registration_service
        .admin_list(user.auth(), parse_optional(&query.status), &query.params(&state))
        .await?;
    Ok(Json(result.into()))
}

async fn get_registration(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MentorRegistration>, ApiError> {
    let registration = state.registration_service.get(user.auth(), id).await?;
    Ok(Json(registration))
}

async fn approve(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<NotesBody>>,
) -> Result<Json<MentorRegistration>, ApiError> {
    let notes = body.and_then(|Json(b)| b.admin_notes);
    let registration = state.registration_service.approve(user.auth(), id, notes).await?;
    Ok(Json(registration))
}

async fn reject(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<NotesBody>>,
) -> Result<Json<MentorRegistration>, ApiError> {
    let notes = body.and_then(|Json(b)| b.admin_notes);
    let registration = state.registration_service.reject(user.auth(), id, notes).await?;
    Ok(Json(registration))
}
