//! Account API endpoints
//!
//! Everything here acts on the signed-in user:
//! - GET/PUT /api/v1/account/profile
//! - POST /api/v1/account/avatar (multipart, field `file`)
//! - GET/POST /api/v1/account/mentor-registration
//! - GET/POST /api/v1/account/bookings

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::common::read_file_field;
use super::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{
    CreateBookingInput, CreateRegistrationInput, MentorBooking, MentorRegistration, Profile, UpdateProfileInput,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/avatar", post(upload_avatar))
        .route("/mentor-registration", get(list_registrations).post(submit_registration))
        .route("/bookings", get(list_bookings).post(create_booking))
}

/// GET /api/v1/account/profile
async fn get_profile(State(state): State<AppState>, user: AuthenticatedUser) -> Result<Json<Profile>, ApiError> {
    let profile = state.profile_service.get(user.auth(), user.profile.id).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/account/profile
async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(mut input): Json<UpdateProfileInput>,
) -> Result<Json<Profile>, ApiError> {
    // The avatar only changes through the upload endpoint
    input.avatar_url = None;
    let profile = state
        .profile_service
        .update_mine(user.auth(), &user.profile, input)
        .await?;
    Ok(Json(profile))
}

/// POST /api/v1/account/avatar
async fn upload_avatar(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<Profile>, ApiError> {
    let file = read_file_field(&mut multipart).await?;
    let url = state
        .upload_service
        .upload_avatar(user.auth(), user.profile.id, &file.content_type, file.data)
        .await?;
    let profile = state
        .profile_service
        .set_avatar(user.auth(), &user.profile, url)
        .await?;
    Ok(Json(profile))
}

/// GET /api/v1/account/mentor-registration
async fn list_registrations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<MentorRegistration>>, ApiError> {
    let registrations = state
        .registration_service
        .list_mine(user.auth(), &user.profile)
        .await?;
    Ok(Json(registrations))
}

/// POST /api/v1/account/mentor-registration
async fn submit_registration(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreateRegistrationInput>,
) -> Result<(StatusCode, Json<MentorRegistration>), ApiError> {
    let registration = state
        .registration_service
        .submit(user.auth(), &user.profile, input)
        .await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// GET /api/v1/account/bookings
async fn list_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<MentorBooking>>, ApiError> {
    let bookings = state.booking_service.list_mine(user.auth(), &user.profile).await?;
    Ok(Json(bookings))
}

/// POST /api/v1/account/bookings
async fn create_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreateBookingInput>,
) -> Result<(StatusCode, Json<MentorBooking>), ApiError> {
    let booking = state
        .booking_service
        .create(user.auth(), &user.profile, input)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}
