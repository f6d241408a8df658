//! Admin API endpoints
//!
//! CRUD panels behind `require_admin`:
//! - /api/v1/admin/mentors
//! - /api/v1/admin/bookings
//! - /api/v1/admin/posts
//! - /api/v1/admin/tags
//! - /api/v1/admin/skills
//! - /api/v1/admin/registrations
//! - /api/v1/admin/users
//! - /api/v1/admin/stats
//! - /api/v1/admin/upload/thumbnail

mod bookings;
mod mentors;
mod posts;
mod registrations;
mod skills;
mod stats;
mod tags;
mod users;

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::common::{list_params, non_blank, read_file_field};
use super::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::ListParams;

/// Build the admin router; auth and role gates are applied by the caller
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/mentors", mentors::router())
        .nest("/bookings", bookings::router())
        .nest("/posts", posts::router())
        .nest("/tags", tags::router())
        .nest("/skills", skills::router())
        .nest("/registrations", registrations::router())
        .nest("/users", users::router())
        .nest("/stats", stats::router())
        .route("/upload/thumbnail", post(upload_thumbnail))
}

/// Query shared by the admin tables; each table reads the filters it knows
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, rename = "type")]
    pub post_type: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl AdminListQuery {
    pub fn params(&self, state: &AppState) -> ListParams {
        list_params(self.page, self.per_page, state.config.ui.admin_page_size)
    }

    pub fn search(&self) -> Option<String> {
        non_blank(&self.search)
    }

    /// Active filters, carried along by page links
    pub fn filters(&self) -> Vec<(&str, Option<&str>)> {
        vec![
            ("search", self.search.as_deref()),
            ("status", self.status.as_deref()),
            ("published", self.published.as_deref()),
            ("role", self.role.as_deref()),
            ("type", self.post_type.as_deref()),
            ("tag", self.tag.as_deref()),
            ("skill", self.skill.as_deref()),
        ]
    }
}

/// Body for publish toggles
#[derive(Debug, Deserialize)]
pub struct PublishBody {
    pub published: bool,
}

/// Body for approve/reject decisions
#[derive(Debug, Default, Deserialize)]
pub struct NotesBody {
    #[serde(default)]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/v1/admin/upload/thumbnail
async fn upload_thumbnail(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_file_field(&mut multipart).await?;
    let url = state
        .upload_service
        .upload_thumbnail(user.auth(), &file.content_type, file.data)
        .await?;
    Ok(Json(UploadResponse { url }))
}
