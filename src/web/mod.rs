//! Server-rendered pages
//!
//! Public marketing pages, the auth forms, the account area and the admin
//! panels, rendered with Tera. Templates and static assets are embedded in
//! the binary. Form posts redirect back with a flash notification keyed by
//! the caller's `nid` cookie.

mod account;
mod admin;
mod auth;
mod error;
mod pages;
mod render;

pub use error::TemplateError;
pub use render::{CurrentUser, Page, Pager, Renderer, SITE_NAME};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use rust_embed::RustEmbed;
use uuid::Uuid;

use crate::api::common::{client_key, ensure_client_key};
use crate::api::middleware::{self, AppState};
use crate::services::NotificationKind;

#[derive(RustEmbed)]
#[folder = "static/"]
#[include = "*"]
struct StaticAssets;

/// Build the HTML router
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/blog", get(pages::blog))
        .route("/blog/{id}", get(pages::post_detail))
        .route("/blog/{id}/comments", post(pages::post_comment))
        .route("/comments/{id}/delete", post(pages::delete_comment))
        .route("/activities", get(pages::activities))
        .route("/mentors", get(pages::mentors))
        .route("/mentors/{id}", get(pages::mentor_detail))
        .route("/mentors/{id}/book", post(pages::book_mentor))
        .route("/sign-in", get(auth::sign_in_page).post(auth::sign_in))
        .route("/sign-up", get(auth::sign_up_page).post(auth::sign_up))
        .route("/verify-otp", get(auth::verify_otp_page).post(auth::verify_otp))
        .route("/resend-otp", post(auth::resend_otp))
        .route("/forgot-password", get(auth::forgot_password_page).post(auth::forgot_password))
        .route("/reset-password", get(auth::reset_password_page).post(auth::reset_password))
        .route("/sign-out", post(auth::sign_out))
        .route("/account", get(account::page))
        .route("/account/profile", post(account::update_profile))
        .route("/account/avatar", post(account::upload_avatar))
        .route("/account/registration", post(account::submit_registration))
        .route("/notifications/{id}/dismiss", post(dismiss_notification))
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn_with_state(state, middleware::optional_auth))
        .route("/static/{*path}", get(serve_static))
        .fallback(pages::not_found)
}

/// Queue a notification for the caller, minting its `nid` cookie if needed
pub(crate) async fn flash(
    state: &AppState,
    request_headers: &HeaderMap,
    response_headers: &mut HeaderMap,
    kind: NotificationKind,
    message: impl Into<String>,
) {
    let client = ensure_client_key(request_headers, response_headers);
    state.notifications.push(&client, kind, message).await;
}

/// Redirect after a form post, carrying one notification
pub(crate) async fn redirect_with(
    state: &AppState,
    request_headers: &HeaderMap,
    to: &str,
    kind: NotificationKind,
    message: impl Into<String>,
) -> Response {
    let mut headers = HeaderMap::new();
    flash(state, request_headers, &mut headers, kind, message).await;
    (headers, Redirect::to(to)).into_response()
}

/// Copy every header of `src` into `dst`, keeping repeated `Set-Cookie` values
pub(crate) fn append_headers(dst: &mut HeaderMap, src: HeaderMap) {
    for (name, value) in src.iter() {
        dst.append(name.clone(), value.clone());
    }
}

/// Sign-in page that comes back to `path` afterwards
pub(crate) fn sign_in_url(path: &str) -> String {
    format!("/sign-in?next={}", urlencoding::encode(path))
}

/// Local redirect target; anything else falls back to `default`.
///
/// Browsers read `\` as `/`, so a backslash anywhere is refused along with
/// control characters and a second leading slash.
pub(crate) fn safe_next<'a>(next: Option<&'a str>, default: &'a str) -> &'a str {
    match next.map(str::trim) {
        Some(path) if is_local_path(path) => path,
        _ => default,
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.chars().any(|c| c == '\\' || c.is_control())
}

/// POST /notifications/{id}/dismiss
async fn dismiss_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if let Some(client) = client_key(&headers) {
        state.notifications.dismiss(&client, id).await;
    }
    StatusCode::NO_CONTENT
}

/// GET /static/{*path}
async fn serve_static(Path(path): Path<String>) -> Response {
    let decoded = urlencoding::decode(&path)
        .map(|p| p.into_owned())
        .unwrap_or(path);
    match StaticAssets::get(&decoded) {
        Some(content) => (
            [
                (header::CONTENT_TYPE, content_type(&decoded)),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            Body::from(content.data.into_owned()),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "css" => "text/css",
        "js" => "application/javascript",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests;
