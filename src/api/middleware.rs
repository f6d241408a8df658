//! API middleware
//!
//! Contains middleware for:
//! - Authentication (access token from bearer header or session cookie)
//! - Authorization (admin area gate)
//!
//! and the shared `AppState` / `ApiError` types used by every handler.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use super::common::{read_cookie, session_cookies, REFRESH_COOKIE, SESSION_COOKIE};
use crate::backend::repositories::Repositories;
use crate::backend::{AuthProvider, AuthToken, BackendError, ObjectStorage};
use crate::config::Config;
use crate::models::Profile;
use crate::services::messages::SESSION_EXPIRED;
use crate::web::Renderer;
use crate::services::{
    AuthService, BookingService, CommentService, Debouncer, MentorService, NotificationCenter, PostService,
    ProfileService, RegistrationService, ServiceError, SkillService, StatsService, TagService, UploadService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: Arc<AuthService>,
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
    pub mentor_service: Arc<MentorService>,
    pub booking_service: Arc<BookingService>,
    pub registration_service: Arc<RegistrationService>,
    pub skill_service: Arc<SkillService>,
    pub tag_service: Arc<TagService>,
    pub profile_service: Arc<ProfileService>,
    pub stats_service: Arc<StatsService>,
    pub upload_service: Arc<UploadService>,
    pub notifications: Arc<NotificationCenter>,
    pub debouncer: Arc<Debouncer>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    /// Wire every service on top of the given backend seams
    pub fn new(
        config: Config,
        repos: Repositories,
        auth: Arc<dyn AuthProvider>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let ui = &config.ui;
        let notifications = NotificationCenter::new(ui.notification_max_visible, ui.notification_duration_ms);
        let debouncer = Debouncer::new(ui.search_debounce_ms);

        Self {
            auth_service: Arc::new(AuthService::new(auth, repos.profiles.clone())),
            post_service: Arc::new(PostService::new(repos.posts)),
            comment_service: Arc::new(CommentService::new(repos.comments)),
            mentor_service: Arc::new(MentorService::new(repos.mentors.clone())),
            booking_service: Arc::new(BookingService::new(repos.bookings, repos.mentors)),
            registration_service: Arc::new(RegistrationService::new(repos.registrations)),
            skill_service: Arc::new(SkillService::new(repos.skills)),
            tag_service: Arc::new(TagService::new(repos.tags)),
            profile_service: Arc::new(ProfileService::new(repos.profiles)),
            stats_service: Arc::new(StatsService::new(repos.stats)),
            upload_service: Arc::new(UploadService::new(storage, config.storage.clone())),
            notifications: Arc::new(notifications),
            debouncer: Arc::new(debouncer),
            renderer: Arc::new(Renderer::embedded()),
            config: Arc::new(config),
        }
    }
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub profile: Profile,
    /// Caller's access token, forwarded so row-level security sees the user
    pub token: AuthToken,
}

impl AuthenticatedUser {
    pub fn auth(&self) -> &AuthToken {
        &self.token
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthenticatedUser>().cloned())
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    /// A newer search from the same client replaced this one
    pub fn superseded() -> Self {
        Self::new("SUPERSEDED", "Superseded by a newer request")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "SUPERSEDED" => StatusCode::NO_CONTENT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        (status, Json(self)).into_response()
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.user_message();
        match &err {
            ServiceError::ValidationError(_) => ApiError::validation_error(message),
            ServiceError::NotFound(_) => ApiError::not_found(message),
            ServiceError::Forbidden(_) => ApiError::forbidden(message),
            ServiceError::Unauthorized(_) => ApiError::unauthorized(message),
            ServiceError::Conflict(_) => ApiError::conflict(message),
            ServiceError::Backend(e) if e.is_unauthorized() => ApiError::unauthorized(SESSION_EXPIRED),
            ServiceError::Backend(e) if e.is_forbidden() => ApiError::forbidden(message),
            ServiceError::Backend(e) if e.is_conflict() => ApiError::conflict(message),
            ServiceError::Backend(BackendError::NotFound) => ApiError::not_found(message),
            ServiceError::Backend(e) if e.status().is_some_and(|s| (400..500).contains(&s)) => {
                ApiError::validation_error(message)
            }
            ServiceError::Backend(e) => {
                tracing::error!("Backend failure: {}", e);
                ApiError::internal_error(message)
            }
        }
    }
}

/// Extract session token from request
pub fn extract_session_token(request: &Request) -> Option<String> {
    session_token(request.headers())
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    read_cookie(headers, SESSION_COOKIE)
}

async fn resolve(state: &AppState, token: String) -> Result<Option<AuthenticatedUser>, ServiceError> {
    let profile = state.auth_service.resolve_session(&token).await?;
    Ok(profile.map(|profile| AuthenticatedUser {
        profile,
        token: AuthToken::bearer(token),
    }))
}

/// Caller of a request, with replacement session cookies when the access
/// token had to be renewed from the `refresh_token` cookie
#[derive(Default)]
struct Caller {
    user: Option<AuthenticatedUser>,
    renewed: Option<HeaderMap>,
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Caller, ServiceError> {
    if let Some(token) = session_token(headers) {
        if let Some(user) = resolve(state, token).await? {
            return Ok(Caller { user: Some(user), renewed: None });
        }
    }

    let Some(refresh_token) = read_cookie(headers, REFRESH_COOKIE) else {
        return Ok(Caller::default());
    };
    let session = match state.auth_service.refresh(&refresh_token).await {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!("Session refresh failed: {}", e);
            return Ok(Caller::default());
        }
    };

    let user = resolve(state, session.access_token.clone()).await?;
    if let Some(user) = &user {
        tracing::debug!("Renewed session for user {}", user.profile.id);
    }
    Ok(Caller {
        user,
        renewed: Some(session_cookies(&session, state.config.server.secure_cookies)),
    })
}

/// Attach renewed session cookies unless the handler already set its own
/// (sign-in and sign-out do)
fn with_renewed(mut response: Response, renewed: Option<HeaderMap>) -> Response {
    let Some(cookies) = renewed else {
        return response;
    };
    let handler_set_session = response.headers().get_all(header::SET_COOKIE).iter().any(|v| {
        v.to_str()
            .ok()
            .and_then(|c| c.split('=').next())
            .is_some_and(|name| name == SESSION_COOKIE || name == REFRESH_COOKIE)
    });
    if !handler_set_session {
        for (name, value) in cookies.iter() {
            response.headers_mut().append(name.clone(), value.clone());
        }
    }
    response
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if extract_session_token(&request).is_none() && read_cookie(request.headers(), REFRESH_COOKIE).is_none() {
        return Err(ApiError::unauthorized("Missing authentication token"));
    }

    let caller = authenticate(&state, request.headers()).await?;
    let user = caller.user.ok_or_else(|| ApiError::unauthorized(SESSION_EXPIRED))?;

    request.extensions_mut().insert(user);
    Ok(with_renewed(next.run(request).await, caller.renewed))
}

/// Optional authentication middleware
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let renewed = match authenticate(&state, request.headers()).await {
        Ok(caller) => {
            if let Some(user) = caller.user {
                request.extensions_mut().insert(user);
            }
            caller.renewed
        }
        Err(e) => {
            tracing::warn!("Session lookup failed: {}", e);
            None
        }
    };
    with_renewed(next.run(request).await, renewed)
}

/// Admin authorization middleware
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.profile.is_admin() {
        tracing::warn!("User {} denied access to {}", user.profile.id, request.uri().path());
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}
