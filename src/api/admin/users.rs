//! Admin user list and role changes

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::AdminListQuery;
use crate::api::common::{parse_optional, ListResponse};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Profile, ProfileFilter, UserRole};

#[derive(Debug, Deserialize)]
pub struct RoleBody {
    pub role: UserRole,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}/role", put(set_role))
}

async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ListResponse<Profile>>, ApiError> {
    let filter = ProfileFilter {
        role: parse_optional(&query.role),
        search: query.search(),
    };
    let result = state
        .profile_service
        .admin_list(user.auth(), &filter, &query.params(&state))
        .await?;
    Ok(Json(result.into()))
}

/// PUT /api/v1/admin/users/{id}/role - superadmin only
async fn set_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RoleBody>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .profile_service
        .set_role(user.auth(), &user.profile, id, body.role)
        .await?;
    Ok(Json(profile))
}
