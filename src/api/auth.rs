//! Auth API endpoints
//!
//! Handles HTTP requests for authentication:
//! - POST /api/v1/auth/sign-in - Password sign-in
//! - POST /api/v1/auth/sign-up - Registration (usually followed by an OTP)
//! - POST /api/v1/auth/verify-otp - Confirm a mailed code
//! - POST /api/v1/auth/resend-otp - Mail a new code
//! - POST /api/v1/auth/forgot-password - Mail a recovery code
//! - POST /api/v1/auth/refresh - Exchange the refresh token
//! - POST /api/v1/auth/reset-password - Set a new password (auth)
//! - POST /api/v1/auth/sign-out - End the session (auth)
//! - GET /api/v1/auth/me - Current profile (auth)

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::common::{clear_session_cookies, read_cookie, session_cookies, REFRESH_COOKIE};
use super::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::backend::{AuthSession, OtpType, SignUpOutcome, SignUpRequest};
use crate::models::Profile;
use crate::services::messages::SESSION_EXPIRED;

#[derive(Debug, Deserialize)]
pub struct SignInBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpBody {
    pub email: String,
    pub token: String,
    #[serde(default, rename = "type")]
    pub kind: OtpType,
}

#[derive(Debug, Deserialize)]
pub struct ResendOtpBody {
    pub email: String,
    #[serde(default, rename = "type")]
    pub kind: OtpType,
}

#[derive(Debug, Deserialize)]
pub struct EmailBody {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshBody {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    pub password: String,
    pub confirm_password: String,
}

/// Response for a signed-in session
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: Profile,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Response when the account still has to be confirmed
#[derive(Debug, Serialize, Deserialize)]
pub struct PendingConfirmationResponse {
    pub confirmation_required: bool,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self { message: message.into() })
    }
}

/// Build the public auth router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/sign-in", post(sign_in))
        .route("/sign-up", post(sign_up))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/forgot-password", post(forgot_password))
        .route("/refresh", post(refresh))
}

/// Build the auth router for signed-in users
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/reset-password", post(reset_password))
        .route("/sign-out", post(sign_out))
        .route("/me", get(me))
}

/// Profile behind a fresh session, plus the cookies persisting it
async fn session_response(state: &AppState, session: AuthSession) -> Result<Response, ApiError> {
    let user = state
        .auth_service
        .resolve_session(&session.access_token)
        .await?
        .ok_or_else(|| ApiError::unauthorized(SESSION_EXPIRED))?;

    let headers = session_cookies(&session, state.config.server.secure_cookies);
    let body = AuthResponse {
        user,
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: session.expires_in,
    };
    Ok((headers, Json(body)).into_response())
}

/// POST /api/v1/auth/sign-in
async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInBody>,
) -> Result<Response, ApiError> {
    let session = state.auth_service.sign_in(&body.email, &body.password).await?;
    session_response(&state, session).await
}

/// POST /api/v1/auth/sign-up
async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpBody>,
) -> Result<Response, ApiError> {
    let request = SignUpRequest {
        email: body.email,
        password: body.password,
        full_name: body.full_name,
        phone: body.phone,
    };
    match state.auth_service.sign_up(request, &body.confirm_password).await? {
        SignUpOutcome::SignedIn(session) => session_response(&state, session).await,
        SignUpOutcome::ConfirmationRequired(user) => Ok((
            StatusCode::CREATED,
            Json(PendingConfirmationResponse {
                confirmation_required: true,
                email: user.email.unwrap_or_default(),
            }),
        )
            .into_response()),
    }
}

/// POST /api/v1/auth/verify-otp
async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpBody>,
) -> Result<Response, ApiError> {
    let session = state
        .auth_service
        .verify_otp(&body.email, &body.token, body.kind)
        .await?;
    session_response(&state, session).await
}

/// POST /api/v1/auth/resend-otp
async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<ResendOtpBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.resend_otp(&body.email, body.kind).await?;
    Ok(MessageResponse::new("Mã xác thực mới đã được gửi tới email của bạn"))
}

/// POST /api/v1/auth/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.forgot_password(&body.email).await?;
    Ok(MessageResponse::new("Mã khôi phục đã được gửi tới email của bạn"))
}

/// POST /api/v1/auth/refresh
///
/// Uses the body token when present, else the `refresh_token` cookie.
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshBody>>,
) -> Result<Response, ApiError> {
    let token = body
        .and_then(|Json(b)| b.refresh_token)
        .or_else(|| read_cookie(&headers, REFRESH_COOKIE))
        .ok_or_else(|| ApiError::unauthorized(SESSION_EXPIRED))?;
    let session = state.auth_service.refresh(&token).await?;
    session_response(&state, session).await
}

/// POST /api/v1/auth/reset-password
async fn reset_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<ResetPasswordBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service
        .reset_password(user.auth(), &body.password, &body.confirm_password)
        .await?;
    Ok(MessageResponse::new("Mật khẩu đã được cập nhật"))
}

/// POST /api/v1/auth/sign-out
async fn sign_out(State(state): State<AppState>, user: AuthenticatedUser) -> Result<Response, ApiError> {
    state.auth_service.sign_out(user.auth()).await?;
    let headers = clear_session_cookies(state.config.server.secure_cookies);
    Ok((headers, MessageResponse::new("Đã đăng xuất")).into_response())
}

/// GET /api/v1/auth/me
async fn me(user: AuthenticatedUser) -> Json<Profile> {
    Json(user.profile)
}
