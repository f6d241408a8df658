//! Page-level tests over the in-memory backend

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::api::{build_router, AppState};
use crate::config::Config;
use crate::models::{PostType, UserRole};
use crate::testing::{FakeAuthProvider, FakeStorage, InMemoryStore};

struct Harness {
    server: TestServer,
    store: InMemoryStore,
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    let state = AppState::new(
        Config::default(),
        store.repositories(),
        Arc::new(FakeAuthProvider::new(store.clone())),
        Arc::new(FakeStorage::default()),
    );
    let server = TestServer::new(build_router(state)).unwrap();
    Harness { server, store }
}

fn set_cookie(response: &TestResponse, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|c| c.starts_with(&prefix))
        .map(|c| c.split(';').next().unwrap_or_default().to_string())
}

fn location(response: &TestResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn cookie(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap()
}

fn session_cookie(h: &Harness, email: &str, role: UserRole) -> HeaderValue {
    let profile = h.store.add_user(email, "secret123", role);
    cookie(&format!("session={}", h.store.session_for(&profile)))
}

#[tokio::test]
async fn test_home_lists_published_content() {
    let h = harness();
    h.store.add_mentor("Nguyễn Hòa", true);
    h.store.add_mentor("Mentor Ẩn", false);
    h.store.add_post("Phỏng vấn hành vi", PostType::Blog, true);

    let response = h.server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(set_cookie(&response, "nid").is_some());

    let html = response.text();
    assert!(html.contains("HR Companion"));
    assert!(html.contains("Nguyễn Hòa"));
    assert!(!html.contains("Mentor Ẩn"));
    assert!(html.contains("Phỏng vấn hành vi"));
}

#[tokio::test]
async fn test_failed_sign_in_flashes_on_next_page() {
    let h = harness();
    h.store.add_user("mai.tran@example.com", "secret123", UserRole::User);

    let response = h
        .server
        .post("/sign-in")
        .form(&[("email", "mai.tran@example.com"), ("password", "wrong")])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/sign-in");
    let nid = set_cookie(&response, "nid").unwrap();

    let page = h.server.get("/sign-in").add_header(header::COOKIE, cookie(&nid)).await;
    assert!(page.text().contains("Email hoặc mật khẩu không đúng"));

    // Shown once
    let again = h.server.get("/sign-in").add_header(header::COOKIE, cookie(&nid)).await;
    assert!(!again.text().contains("Email hoặc mật khẩu không đúng"));
}

#[tokio::test]
async fn test_sign_in_redirects_to_local_next_only() {
    let h = harness();
    h.store.add_user("mai.tran@example.com", "secret123", UserRole::User);

    let response = h
        .server
        .post("/sign-in")
        .form(&[
            ("email", "mai.tran@example.com"),
            ("password", "secret123"),
            ("next", "/mentors"),
        ])
        .await;
    assert_eq!(location(&response), "/mentors");
    assert!(set_cookie(&response, "session").is_some());

    let response = h
        .server
        .post("/sign-in")
        .form(&[
            ("email", "mai.tran@example.com"),
            ("password", "secret123"),
            ("next", "//evil.example.com"),
        ])
        .await;
    assert_eq!(location(&response), "/account");

    for next in [
        "/\\evil.example.com",
        "/\\/evil.example.com",
        "/\r/evil.example.com",
        "/\tevil.example.com",
    ] {
        let response = h
            .server
            .post("/sign-in")
            .form(&[
                ("email", "mai.tran@example.com"),
                ("password", "secret123"),
                ("next", next),
            ])
            .await;
        assert_eq!(location(&response), "/account", "{}", next);
    }

    // Already signed in: the page itself redirects
    let session = set_cookie(&response, "session").unwrap();
    let response = h
        .server
        .get("/sign-in?next=/%5Cevil.example.com")
        .add_header(header::COOKIE, cookie(&session))
        .await;
    assert_eq!(location(&response), "/account");
}

#[tokio::test]
async fn test_admin_pages_are_gated() {
    let h = harness();

    let response = h.server.get("/admin").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/sign-in?next=%2Fadmin"));

    let user = session_cookie(&h, "user@example.com", UserRole::User);
    let response = h.server.get("/admin/mentors").add_header(header::COOKIE, user).await;
    assert_eq!(location(&response), "/");

    let admin = session_cookie(&h, "admin@example.com", UserRole::Admin);
    let response = h.server.get("/admin").add_header(header::COOKIE, admin).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Tổng quan"));
}

#[tokio::test]
async fn test_admin_tables_render() {
    let h = harness();
    h.store.add_mentor("Phạm Quân", false);
    h.store.add_tag("tuyển dụng", true);
    h.store.add_skill("C&B", true);
    let admin = session_cookie(&h, "admin@example.com", UserRole::Superadmin);

    for path in [
        "/admin/mentors",
        "/admin/mentors/new",
        "/admin/bookings",
        "/admin/posts",
        "/admin/posts/new",
        "/admin/tags",
        "/admin/skills",
        "/admin/registrations",
        "/admin/users",
    ] {
        let response = h.server.get(path).add_header(header::COOKIE, admin.clone()).await;
        assert_eq!(response.status_code(), StatusCode::OK, "{}", path);
        assert!(!response.text().contains("Đã có lỗi xảy ra"), "{}", path);
    }

    let mentors = h.server.get("/admin/mentors").add_header(header::COOKIE, admin).await;
    assert!(mentors.text().contains("Phạm Quân"));
}

#[tokio::test]
async fn test_admin_creates_tag_from_form() {
    let h = harness();
    let admin = session_cookie(&h, "admin@example.com", UserRole::Admin);

    let response = h
        .server
        .post("/admin/tags")
        .add_header(header::COOKIE, admin.clone())
        .form(&[("name", "Văn hóa"), ("published", "on")])
        .await;
    assert_eq!(location(&response), "/admin/tags");

    let public = h.server.get("/api/v1/tags").await;
    let body: serde_json::Value = public.json();
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["name"] == "Văn hóa"));
}

#[tokio::test]
async fn test_comment_form_round() {
    let h = harness();
    let post = h.store.add_post("Đánh giá năng lực", PostType::Blog, true);

    let response = h
        .server
        .post(&format!("/blog/{}/comments", post.id))
        .form(&[("content", "Rất hữu ích")])
        .await;
    assert!(location(&response).starts_with("/sign-in?next="));

    let user = session_cookie(&h, "reader@example.com", UserRole::User);
    let response = h
        .server
        .post(&format!("/blog/{}/comments", post.id))
        .add_header(header::COOKIE, user.clone())
        .form(&[("content", "Rất hữu ích")])
        .await;
    assert_eq!(location(&response), format!("/blog/{}#comments", post.id));

    let page = h
        .server
        .get(&format!("/blog/{}", post.id))
        .add_header(header::COOKIE, user)
        .await;
    assert_eq!(page.status_code(), StatusCode::OK);
    let html = page.text();
    assert!(html.contains("Rất hữu ích"));
    assert!(html.contains("Bình luận (1)"));
}

#[tokio::test]
async fn test_booking_in_the_past_is_rejected() {
    let h = harness();
    let mentor = h.store.add_mentor("Võ Thảo", true);
    let user = session_cookie(&h, "mentee@example.com", UserRole::User);
    let past = (Utc::now() - Duration::days(2)).format("%Y-%m-%dT%H:%M").to_string();

    let response = h
        .server
        .post(&format!("/mentors/{}/book", mentor.id))
        .add_header(header::COOKIE, user.clone())
        .form(&[("session_type", "online"), ("scheduled_at", past.as_str())])
        .await;
    assert_eq!(location(&response), format!("/mentors/{}", mentor.id));

    let future = (Utc::now() + Duration::days(3)).format("%Y-%m-%dT%H:%M").to_string();
    let response = h
        .server
        .post(&format!("/mentors/{}/book", mentor.id))
        .add_header(header::COOKIE, user)
        .form(&[("session_type", "offline"), ("scheduled_at", future.as_str())])
        .await;
    assert_eq!(location(&response), "/account#bookings");
}

#[tokio::test]
async fn test_account_requires_sign_in() {
    let h = harness();
    let response = h.server.get("/account").await;
    assert!(location(&response).starts_with("/sign-in?next=%2Faccount"));

    let user = session_cookie(&h, "mai@example.com", UserRole::User);
    let response = h.server.get("/account").add_header(header::COOKIE, user).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("mai@example.com"));
}

#[tokio::test]
async fn test_expired_session_is_renewed_from_refresh_cookie() {
    let h = harness();
    let profile = h.store.add_user("mai@example.com", "secret123", UserRole::User);
    let access = h.store.session_for(&profile);
    let refresh = h.store.refresh_token_for(&profile);
    h.store.expire_session(&access);

    let response = h
        .server
        .get("/account")
        .add_header(header::COOKIE, cookie(&format!("session={}; refresh_token={}", access, refresh)))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("mai@example.com"));

    let session = set_cookie(&response, "session").unwrap();
    assert_ne!(session, format!("session={}", access));
    let renewed_refresh = set_cookie(&response, "refresh_token").unwrap();
    assert_ne!(renewed_refresh, format!("refresh_token={}", refresh));

    // The renewed cookies carry the next request
    let response = h
        .server
        .get("/account")
        .add_header(header::COOKIE, cookie(&format!("{}; {}", session, renewed_refresh)))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(set_cookie(&response, "session").is_none());

    // A spent refresh token signs nobody in
    let response = h
        .server
        .get("/account")
        .add_header(header::COOKIE, cookie(&format!("refresh_token={}", refresh)))
        .await;
    assert!(location(&response).starts_with("/sign-in?next=%2Faccount"));
}

#[tokio::test]
async fn test_sign_out_with_expired_session_stays_signed_out() {
    let h = harness();
    let profile = h.store.add_user("mai@example.com", "secret123", UserRole::User);
    let refresh = h.store.refresh_token_for(&profile);

    let response = h
        .server
        .post("/sign-out")
        .add_header(header::COOKIE, cookie(&format!("refresh_token={}", refresh)))
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(set_cookie(&response, "session").as_deref(), Some("session="));
}

#[tokio::test]
async fn test_static_assets_and_unknown_paths() {
    let h = harness();

    let css = h.server.get("/static/app.css").await;
    assert_eq!(css.status_code(), StatusCode::OK);
    assert_eq!(css.headers().get(header::CONTENT_TYPE).unwrap(), "text/css");

    let missing = h.server.get("/static/nope.css").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    let page = h.server.get("/khong-ton-tai").await;
    assert_eq!(page.status_code(), StatusCode::NOT_FOUND);
    assert!(page.text().contains("404"));
}

#[tokio::test]
async fn test_draft_post_page_is_not_found() {
    let h = harness();
    let draft = h.store.add_post("Bản nháp", PostType::Blog, false);
    let response = h.server.get(&format!("/blog/{}", draft.id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
