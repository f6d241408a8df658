//! Account area: profile, avatar, mentor application, own bookings

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::Response,
    Form,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{redirect_with, sign_in_url, Page};
use crate::api::common::{non_blank, read_file_field};
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::models::{CreateRegistrationInput, RegistrationStatus, UpdateProfileInput, UserRole};
use crate::services::{NotificationKind, ServiceError};

const ACCOUNT_PATH: &str = "/account";

async fn require_user(state: &AppState, headers: &HeaderMap, user: Option<AuthenticatedUser>) -> Result<AuthenticatedUser, Response> {
    match user {
        Some(user) => Ok(user),
        None => Err(redirect_with(
            state,
            headers,
            &sign_in_url(ACCOUNT_PATH),
            NotificationKind::Info,
            "Vui lòng đăng nhập để tiếp tục",
        )
        .await),
    }
}

/// GET /account
pub async fn page(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
) -> Response {
    let user = match require_user(&state, &headers, user).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };

    let (profile, bookings, registrations) = futures::join!(
        state.profile_service.get(user.auth(), user.profile.id),
        state.booking_service.list_mine(user.auth(), &user.profile),
        state.registration_service.list_mine(user.auth(), &user.profile),
    );

    let mut page = Page::new(&state, &headers, ACCOUNT_PATH, Some(&user));
    match profile {
        Ok(profile) => page.insert("profile", &profile),
        Err(e) => {
            page.report("profile", &e).await;
            page.insert("profile", &user.profile);
        }
    }
    match bookings {
        Ok(bookings) => page.insert("bookings", &bookings),
        Err(e) => page.report("bookings", &e).await,
    }
    match registrations {
        Ok(registrations) => {
            let can_apply = user.profile.role == UserRole::User
                && !registrations.iter().any(|r| r.status == RegistrationStatus::Pending);
            page.insert("can_apply", &can_apply);
            page.insert("registrations", &registrations);
        }
        Err(e) => page.report("registrations", &e).await,
    }
    page.render("account.html").await
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// `YYYY-MM-DD` from a date input
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl ProfileForm {
    fn into_input(self) -> Result<UpdateProfileInput, ServiceError> {
        let date_of_birth = non_blank(&self.date_of_birth)
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .map_err(|_| ServiceError::ValidationError("Ngày sinh không hợp lệ".to_string()))
            })
            .transpose()?;
        Ok(UpdateProfileInput {
            full_name: self.full_name,
            phone: self.phone,
            date_of_birth,
            gender: self.gender,
            address: self.address,
            bio: self.bio,
            avatar_url: None,
        })
    }
}

/// POST /account/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Response {
    let user = match require_user(&state, &headers, user).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let result = match form.into_input() {
        Ok(input) => state.profile_service.update_mine(user.auth(), &user.profile, input).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => redirect_with(&state, &headers, ACCOUNT_PATH, NotificationKind::Success, "Đã lưu hồ sơ").await,
        Err(e) => redirect_with(&state, &headers, ACCOUNT_PATH, NotificationKind::Error, e.user_message()).await,
    }
}

/// POST /account/avatar
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let user = match require_user(&state, &headers, user).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let file = match read_file_field(&mut multipart).await {
        Ok(file) => file,
        Err(e) => {
            return redirect_with(&state, &headers, ACCOUNT_PATH, NotificationKind::Error, e.error.message).await;
        }
    };

    let result = match state
        .upload_service
        .upload_avatar(user.auth(), user.profile.id, &file.content_type, file.data)
        .await
    {
        Ok(url) => state.profile_service.set_avatar(user.auth(), &user.profile, url).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => redirect_with(&state, &headers, ACCOUNT_PATH, NotificationKind::Success, "Đã cập nhật ảnh đại diện").await,
        Err(e) => redirect_with(&state, &headers, ACCOUNT_PATH, NotificationKind::Error, e.user_message()).await,
    }
}

/// POST /account/registration
pub async fn submit_registration(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Form(input): Form<CreateRegistrationInput>,
) -> Response {
    let user = match require_user(&state, &headers, user).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let back = "/account#registration";
    match state.registration_service.submit(user.auth(), &user.profile, input).await {
        Ok(_) => {
            redirect_with(
                &state,
                &headers,
                back,
                NotificationKind::Success,
                "Đã gửi đơn đăng ký mentor, chúng tôi sẽ phản hồi sớm",
            )
            .await
        }
        Err(e) => redirect_with(&state, &headers, back, NotificationKind::Error, e.user_message()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_form_dates() {
        let form = ProfileForm {
            full_name: Some("Trần Mai".to_string()),
            phone: None,
            date_of_birth: Some("1995-04-12".to_string()),
            gender: None,
            address: None,
            bio: None,
        };
        let input = form.into_input().unwrap();
        assert_eq!(input.date_of_birth, NaiveDate::from_ymd_opt(1995, 4, 12));
        assert!(input.avatar_url.is_none());

        let blank = ProfileForm {
            full_name: None,
            phone: None,
            date_of_birth: Some("  ".to_string()),
            gender: None,
            address: None,
            bio: None,
        };
        assert!(blank.into_input().unwrap().date_of_birth.is_none());

        let bad = ProfileForm {
            full_name: None,
            phone: None,
            date_of_birth: Some("12/04/1995".to_string()),
            gender: None,
            address: None,
            bio: None,
        };
        assert!(matches!(bad.into_input(), Err(ServiceError::ValidationError(_))));
    }
}
