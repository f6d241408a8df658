//! Admin booking management

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
use crate::models::{BookingFilter, BookingStatus, MentorBooking};

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: BookingStatus,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings))
        .route("/{id}/status", put(update_status))
}

async fn list_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ListResponse<MentorBooking>>, ApiError> {
    let filter = BookingFilter {
        status: parse_optional(&query.status),
        search: query.search(),
    };
    let result = state
        .booking_service
        .admin_list(user.auth(), &filter, &query.params(&state))
        .await?;
    Ok(Json(result.into()))
}

async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<MentorBooking>, ApiError> {
    let booking = state
        .booking_service
        .update_status(user.auth(), id, body.status)
        .await?;
    Ok(Json(booking))
}
