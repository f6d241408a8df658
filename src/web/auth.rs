//! Auth pages: sign-in, sign-up, OTP verification, password recovery

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::{append_headers, flash, redirect_with, safe_next, sign_in_url, Page};
use crate::api::common::{clear_session_cookies, session_cookies};
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::backend::{AuthSession, OtpType, SignUpOutcome, SignUpRequest};
use crate::services::messages::SESSION_EXPIRED;
use crate::services::NotificationKind;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OtpQuery {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<OtpType>,
}

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpForm {
    pub email: String,
    pub token: String,
    #[serde(default, rename = "type")]
    pub kind: OtpType,
}

#[derive(Debug, Deserialize)]
pub struct ResendForm {
    pub email: String,
    #[serde(default, rename = "type")]
    pub kind: OtpType,
}

#[derive(Debug, Deserialize)]
pub struct EmailForm {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub password: String,
    pub confirm_password: String,
}

fn otp_type_name(kind: OtpType) -> &'static str {
    match kind {
        OtpType::Signup => "signup",
        OtpType::Recovery => "recovery",
        OtpType::Email => "email",
    }
}

fn verify_url(email: &str, kind: OtpType) -> String {
    format!(
        "/verify-otp?email={}&type={}",
        urlencoding::encode(email.trim()),
        otp_type_name(kind)
    )
}

/// Persist the session and move on with a greeting
async fn signed_in(
    state: &AppState,
    request_headers: &HeaderMap,
    session: &AuthSession,
    to: &str,
    message: &str,
) -> Response {
    let mut headers = HeaderMap::new();
    append_headers(
        &mut headers,
        session_cookies(session, state.config.server.secure_cookies),
    );
    flash(state, request_headers, &mut headers, NotificationKind::Success, message).await;
    (headers, Redirect::to(to)).into_response()
}

/// GET /sign-in
pub async fn sign_in_page(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<NextQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to(safe_next(query.next.as_deref(), "/account")).into_response();
    }
    let mut page = Page::new(&state, &headers, "/sign-in", None);
    page.insert("next", &query.next.unwrap_or_default());
    page.render("auth/sign_in.html").await
}

/// POST /sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SignInForm>,
) -> Response {
    match state.auth_service.sign_in(&form.email, &form.password).await {
        Ok(session) => {
            let to = safe_next(form.next.as_deref(), "/account").to_string();
            signed_in(&state, &headers, &session, &to, "Đăng nhập thành công").await
        }
        Err(e) => {
            let back = match form.next.as_deref() {
                Some(next) => sign_in_url(safe_next(Some(next), "/account")),
                None => "/sign-in".to_string(),
            };
            redirect_with(&state, &headers, &back, NotificationKind::Error, e.user_message()).await
        }
    }
}

/// GET /sign-up
pub async fn sign_up_page(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }
    Page::new(&state, &headers, "/sign-up", None)
        .render("auth/sign_up.html")
        .await
}

/// POST /sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SignUpForm>,
) -> Response {
    let request = SignUpRequest {
        email: form.email.clone(),
        password: form.password,
        full_name: form.full_name,
        phone: form.phone,
    };
    match state.auth_service.sign_up(request, &form.confirm_password).await {
        Ok(SignUpOutcome::SignedIn(session)) => {
            signed_in(&state, &headers, &session, "/account", "Đăng ký thành công").await
        }
        Ok(SignUpOutcome::ConfirmationRequired(_)) => {
            redirect_with(
                &state,
                &headers,
                &verify_url(&form.email, OtpType::Signup),
                NotificationKind::Info,
                "Vui lòng nhập mã xác thực đã được gửi tới email của bạn",
            )
            .await
        }
        Err(e) => redirect_with(&state, &headers, "/sign-up", NotificationKind::Error, e.user_message()).await,
    }
}

/// GET /verify-otp
pub async fn verify_otp_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OtpQuery>,
) -> Response {
    let mut page = Page::new(&state, &headers, "/verify-otp", None);
    page.insert("email", &query.email.unwrap_or_default());
    page.insert("otp_type", otp_type_name(query.kind.unwrap_or_default()));
    page.render("auth/verify_otp.html").await
}

/// POST /verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<OtpForm>,
) -> Response {
    match state
        .auth_service
        .verify_otp(&form.email, &form.token, form.kind)
        .await
    {
        Ok(session) if form.kind == OtpType::Recovery => {
            signed_in(&state, &headers, &session, "/reset-password", "Vui lòng đặt mật khẩu mới").await
        }
        Ok(session) => signed_in(&state, &headers, &session, "/account", "Xác thực thành công").await,
        Err(e) => {
            redirect_with(
                &state,
                &headers,
                &verify_url(&form.email, form.kind),
                NotificationKind::Error,
                e.user_message(),
            )
            .await
        }
    }
}

/// POST /resend-otp
pub async fn resend_otp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ResendForm>,
) -> Response {
    let back = verify_url(&form.email, form.kind);
    match state.auth_service.resend_otp(&form.email, form.kind).await {
        Ok(()) => {
            redirect_with(&state, &headers, &back, NotificationKind::Success, "Đã gửi lại mã xác thực").await
        }
        Err(e) => redirect_with(&state, &headers, &back, NotificationKind::Error, e.user_message()).await,
    }
}

/// GET /forgot-password
pub async fn forgot_password_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    Page::new(&state, &headers, "/forgot-password", None)
        .render("auth/forgot_password.html")
        .await
}

/// POST /forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<EmailForm>,
) -> Response {
    match state.auth_service.forgot_password(&form.email).await {
        Ok(()) => {
            redirect_with(
                &state,
                &headers,
                &verify_url(&form.email, OtpType::Recovery),
                NotificationKind::Info,
                "Mã khôi phục đã được gửi tới email của bạn",
            )
            .await
        }
        Err(e) => {
            redirect_with(&state, &headers, "/forgot-password", NotificationKind::Error, e.user_message()).await
        }
    }
}

/// GET /reset-password
pub async fn reset_password_page(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
) -> Response {
    let Some(user) = user else {
        return redirect_with(
            &state,
            &headers,
            "/forgot-password",
            NotificationKind::Info,
            "Vui lòng xác thực email trước khi đặt lại mật khẩu",
        )
        .await;
    };
    Page::new(&state, &headers, "/reset-password", Some(&user))
        .render("auth/reset_password.html")
        .await
}

/// POST /reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Form(form): Form<PasswordForm>,
) -> Response {
    let Some(user) = user else {
        return redirect_with(&state, &headers, "/forgot-password", NotificationKind::Error, SESSION_EXPIRED).await;
    };
    match state
        .auth_service
        .reset_password(user.auth(), &form.password, &form.confirm_password)
        .await
    {
        Ok(_) => redirect_with(&state, &headers, "/account", NotificationKind::Success, "Mật khẩu đã được cập nhật").await,
        Err(e) => redirect_with(&state, &headers, "/reset-password", NotificationKind::Error, e.user_message()).await,
    }
}

/// POST /sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
) -> Response {
    if let Some(user) = user {
        if let Err(e) = state.auth_service.sign_out(user.auth()).await {
            // The cookies are cleared either way
            tracing::warn!("Remote sign-out failed for {}: {}", user.profile.id, e);
        }
    }
    let mut response_headers = clear_session_cookies(state.config.server.secure_cookies);
    flash(&state, &headers, &mut response_headers, NotificationKind::Info, "Bạn đã đăng xuất").await;
    (response_headers, Redirect::to("/")).into_response()
}
