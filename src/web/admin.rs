//! Admin panels
//!
//! Tables with search, filters and the page strip, plus small forms for
//! create, edit, publish toggles and status changes. Every form posts
//! back and redirects to its table with a notification.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{redirect_with, sign_in_url, Page, Pager};
use crate::api::admin::AdminListQuery;
use crate::api::common::{non_blank, parse_optional};
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::models::{
    BlockDocument, BookingFilter, BookingStatus, CreateMentorInput, CreatePostInput, CreateTagInput,
    ListParams, MentorFilter, MonthlyCount, PostFilter, PostType, ProfileFilter, RegistrationStatus, SkillInput, TagFilter,
    UpdateMentorInput, UpdatePostInput, UpdateTagInput, UserRole, MAX_PER_PAGE,
};
use crate::services::messages::PERMISSION_DENIED;
use crate::services::{NotificationKind, ServiceError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/mentors", get(mentors).post(create_mentor))
        .route("/mentors/new", get(new_mentor))
        .route("/mentors/{id}", get(edit_mentor).post(update_mentor))
        .route("/mentors/{id}/publish", post(publish_mentor))
        .route("/mentors/{id}/delete", post(delete_mentor))
        .route("/bookings", get(bookings))
        .route("/bookings/{id}/status", post(booking_status))
        .route("/posts", get(posts).post(create_post))
        .route("/posts/new", get(new_post))
        .route("/posts/{id}", get(edit_post).post(update_post))
        .route("/posts/{id}/publish", post(publish_post))
        .route("/posts/{id}/delete", post(delete_post))
        .route("/tags", get(tags).post(create_tag))
        .route("/tags/{id}", post(update_tag))
        .route("/tags/{id}/publish", post(publish_tag))
        .route("/tags/{id}/delete", post(delete_tag))
        .route("/skills", get(skills).post(create_skill))
        .route("/skills/{id}", post(update_skill))
        .route("/skills/{id}/delete", post(delete_skill))
        .route("/registrations", get(registrations))
        .route("/registrations/{id}/approve", post(approve_registration))
        .route("/registrations/{id}/reject", post(reject_registration))
        .route("/users", get(users))
        .route("/users/{id}/role", post(set_role))
}

/// Let admins through; send everyone else away with a notice
async fn require_admin(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<AuthenticatedUser>,
    path: &str,
) -> Result<AuthenticatedUser, Response> {
    match user {
        Some(user) if user.profile.is_admin() => Ok(user),
        Some(user) => {
            tracing::warn!("User {} denied access to {}", user.profile.id, path);
            Err(redirect_with(state, headers, "/", NotificationKind::Error, PERMISSION_DENIED).await)
        }
        None => Err(redirect_with(
            state,
            headers,
            &sign_in_url(path),
            NotificationKind::Info,
            "Vui lòng đăng nhập để tiếp tục",
        )
        .await),
    }
}

macro_rules! admin_or_return {
    ($state:expr, $headers:expr, $user:expr, $path:expr) => {
        match require_admin(&$state, &$headers, $user, $path).await {
            Ok(user) => user,
            Err(redirect) => return redirect,
        }
    };
}

/// Redirect to `back` with a success or error notification
async fn finish<T>(
    state: &AppState,
    headers: &HeaderMap,
    back: &str,
    result: Result<T, ServiceError>,
    success: &str,
) -> Response {
    match result {
        Ok(_) => redirect_with(state, headers, back, NotificationKind::Success, success).await,
        Err(e) => redirect_with(state, headers, back, NotificationKind::Error, e.user_message()).await,
    }
}

/// Select options for an enum column
#[derive(Debug, Serialize)]
struct Choice {
    value: String,
    label: &'static str,
}

fn booking_statuses() -> Vec<Choice> {
    [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ]
    .into_iter()
    .map(|s| Choice { value: s.to_string(), label: s.label() })
    .collect()
}

fn registration_statuses() -> Vec<Choice> {
    [
        RegistrationStatus::Pending,
        RegistrationStatus::Approved,
        RegistrationStatus::Rejected,
    ]
    .into_iter()
    .map(|s| Choice { value: s.to_string(), label: s.label() })
    .collect()
}

fn user_roles() -> Vec<Choice> {
    [UserRole::User, UserRole::Mentor, UserRole::Admin, UserRole::Superadmin]
        .into_iter()
        .map(|r| Choice { value: r.to_string(), label: r.label() })
        .collect()
}

/// Comma-separated ids joined by the page script from checkbox groups
fn parse_ids(value: &Option<String>) -> Vec<Uuid> {
    value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

fn checked(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("on" | "true" | "1"))
}

#[derive(Debug, Deserialize)]
pub struct PublishForm {
    pub published: String,
}

impl PublishForm {
    fn value(&self) -> bool {
        self.published == "true"
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// GET /admin
async fn dashboard(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin");
    let mut page = Page::new(&state, &headers, "/admin", Some(&user));
    match state.stats_service.dashboard(user.auth()).await {
        Ok(stats) => {
            page.insert("completion_rate", &format!("{:.1}", stats.completion_rate()));
            page.insert("month_bars", &month_bars(&stats.bookings_by_month));
            page.insert("stats", &stats);
        }
        Err(e) => page.report("statistics", &e).await,
    }
    page.render("admin/dashboard.html").await
}

/// One column of the monthly bookings chart, scaled to the busiest month
#[derive(Debug, Serialize)]
struct MonthBar {
    month: String,
    count: i64,
    percent: i64,
}

fn month_bars(months: &[MonthlyCount]) -> Vec<MonthBar> {
    let peak = months.iter().map(|m| m.count).max().unwrap_or(0);
    months
        .iter()
        .map(|m| MonthBar {
            month: m.month.clone(),
            count: m.count,
            percent: if peak > 0 { m.count * 100 / peak } else { 0 },
        })
        .collect()
}

// ============================================================================
// Mentors
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MentorForm {
    pub full_name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub skill_ids: Option<String>,
}

/// GET /admin/mentors
async fn mentors(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/mentors");
    let filter = MentorFilter {
        published: parse_optional(&query.published),
        search: query.search(),
        skill_id: parse_optional(&query.skill),
    };
    let mut page = Page::new(&state, &headers, "/admin/mentors", Some(&user));
    page.insert("query", &FilterEcho::from(&query));
    match state.mentor_service.list(user.auth(), &filter, &query.params(&state)).await {
        Ok(result) => {
            page.insert("pager", &Pager::new(&result, &query.filters()));
            page.insert("mentors", &result.items);
        }
        Err(e) => page.report("mentors", &e).await,
    }
    page.render("admin/mentors.html").await
}

async fn mentor_form(state: &AppState, headers: &HeaderMap, user: &AuthenticatedUser, id: Option<Uuid>) -> Response {
    let path = match id {
        Some(id) => format!("/admin/mentors/{}", id),
        None => "/admin/mentors/new".to_string(),
    };
    let mut page = Page::new(state, headers, &path, Some(user));
    page.insert("selected_skills", &Vec::<Uuid>::new());
    if let Some(id) = id {
        match state.mentor_service.get(user.auth(), id).await {
            Ok(mentor) => {
                let skill_ids: Vec<Uuid> = mentor.skills.iter().map(|s| s.id).collect();
                page.insert("selected_skills", &skill_ids);
                page.insert("mentor", &mentor);
            }
            Err(e) => {
                page.report("mentor", &e).await;
                return page.render("not_found.html").await;
            }
        }
    }
    match state.skill_service.admin_list(user.auth(), None, &ListParams::new(1, MAX_PER_PAGE)).await {
        Ok(result) => page.insert("skills", &result.items),
        Err(e) => page.report("skills", &e).await,
    }
    page.render("admin/mentor_form.html").await
}

/// GET /admin/mentors/new
async fn new_mentor(State(state): State<AppState>, user: Option<AuthenticatedUser>, headers: HeaderMap) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/mentors/new");
    mentor_form(&state, &headers, &user, None).await
}

/// GET /admin/mentors/{id}
async fn edit_mentor(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/mentors");
    mentor_form(&state, &headers, &user, Some(id)).await
}

/// POST /admin/mentors
async fn create_mentor(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Form(form): Form<MentorForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/mentors");
    let input = CreateMentorInput {
        full_name: form.full_name,
        user_id: None,
        headline: non_blank(&form.headline),
        avatar_url: non_blank(&form.avatar_url),
        bio: non_blank(&form.bio),
        email: non_blank(&form.email),
        published: checked(&form.published),
        skill_ids: parse_ids(&form.skill_ids),
    };
    match state.mentor_service.create(user.auth(), input).await {
        Ok(mentor) => {
            redirect_with(
                &state,
                &headers,
                &format!("/admin/mentors/{}", mentor.id),
                NotificationKind::Success,
                "Đã tạo mentor",
            )
            .await
        }
        Err(e) => redirect_with(&state, &headers, "/admin/mentors/new", NotificationKind::Error, e.user_message()).await,
    }
}

/// POST /admin/mentors/{id}
async fn update_mentor(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<MentorForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/mentors");
    let input = UpdateMentorInput {
        full_name: Some(form.full_name),
        headline: form.headline,
        avatar_url: form.avatar_url,
        bio: form.bio,
        email: form.email,
        skill_ids: Some(parse_ids(&form.skill_ids)),
    };
    let result = state.mentor_service.update(user.auth(), id, input).await;
    finish(&state, &headers, &format!("/admin/mentors/{}", id), result, "Đã lưu mentor").await
}

/// POST /admin/mentors/{id}/publish
async fn publish_mentor(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<PublishForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/mentors");
    let result = state.mentor_service.set_published(user.auth(), id, form.value()).await;
    finish(&state, &headers, "/admin/mentors", result, "Đã cập nhật trạng thái hiển thị").await
}

/// POST /admin/mentors/{id}/delete
async fn delete_mentor(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/mentors");
    let result = state.mentor_service.delete(user.auth(), id).await;
    finish(&state, &headers, "/admin/mentors", result, "Đã xóa mentor").await
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BookingStatusForm {
    pub status: String,
}

/// GET /admin/bookings
async fn bookings(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/bookings");
    let filter = BookingFilter {
        status: parse_optional(&query.status),
        search: query.search(),
    };
    let mut page = Page::new(&state, &headers, "/admin/bookings", Some(&user));
    page.insert("query", &FilterEcho::from(&query));
    page.insert("statuses", &booking_statuses());
    match state.booking_service.admin_list(user.auth(), &filter, &query.params(&state)).await {
        Ok(result) => {
            page.insert("pager", &Pager::new(&result, &query.filters()));
            page.insert("bookings", &result.items);
        }
        Err(e) => page.report("bookings", &e).await,
    }
    page.render("admin/bookings.html").await
}

/// POST /admin/bookings/{id}/status
async fn booking_status(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<BookingStatusForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/bookings");
    let result = match form.status.parse::<BookingStatus>() {
        Ok(status) => state.booking_service.update_status(user.auth(), id, status).await,
        Err(_) => Err(ServiceError::ValidationError("Trạng thái không hợp lệ".to_string())),
    };
    finish(&state, &headers, "/admin/bookings", result, "Đã cập nhật lịch hẹn").await
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    #[serde(default, rename = "type")]
    pub post_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Paragraphs separated by blank lines; absent when the post holds richer blocks
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub tag_ids: Option<String>,
}

/// GET /admin/posts
async fn posts(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/posts");
    let filter = PostFilter {
        post_type: parse_optional(&query.post_type),
        published: parse_optional(&query.published),
        search: query.search(),
        tag_id: parse_optional(&query.tag),
    };
    let mut page = Page::new(&state, &headers, "/admin/posts", Some(&user));
    page.insert("query", &FilterEcho::from(&query));
    match state.post_service.list(user.auth(), &filter, &query.params(&state)).await {
        Ok(result) => {
            page.insert("pager", &Pager::new(&result, &query.filters()));
            page.insert("posts", &result.items);
        }
        Err(e) => page.report("posts", &e).await,
    }
    page.render("admin/posts.html").await
}

async fn post_form(state: &AppState, headers: &HeaderMap, user: &AuthenticatedUser, id: Option<Uuid>) -> Response {
    let path = match id {
        Some(id) => format!("/admin/posts/{}", id),
        None => "/admin/posts/new".to_string(),
    };
    let mut page = Page::new(state, headers, &path, Some(user));
    page.insert("selected_tags", &Vec::<Uuid>::new());
    if let Some(id) = id {
        match state.post_service.get(user.auth(), id).await {
            Ok(post) => {
                let tag_ids: Vec<Uuid> = post.tags.iter().map(|t| t.id).collect();
                page.insert("selected_tags", &tag_ids);
                page.insert("body", &post.content.as_paragraphs());
                page.insert("post", &post);
            }
            Err(e) => {
                page.report("post", &e).await;
                return page.render("not_found.html").await;
            }
        }
    } else {
        page.insert("body", "");
    }
    let all = ListParams::new(1, MAX_PER_PAGE);
    match state.tag_service.list(user.auth(), &TagFilter::default(), &all).await {
        Ok(result) => page.insert("tags", &result.items),
        Err(e) => page.report("tags", &e).await,
    }
    page.render("admin/post_form.html").await
}

/// GET /admin/posts/new
async fn new_post(State(state): State<AppState>, user: Option<AuthenticatedUser>, headers: HeaderMap) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/posts/new");
    post_form(&state, &headers, &user, None).await
}

/// GET /admin/posts/{id}
async fn edit_post(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/posts");
    post_form(&state, &headers, &user, Some(id)).await
}

/// POST /admin/posts
async fn create_post(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Form(form): Form<PostForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/posts");
    let input = CreatePostInput {
        title: form.title,
        description: non_blank(&form.description),
        thumbnail: non_blank(&form.thumbnail),
        content: BlockDocument::from_paragraphs(form.body.as_deref().unwrap_or_default()),
        post_type: parse_optional::<PostType>(&form.post_type).unwrap_or_default(),
        published: checked(&form.published),
        tag_ids: parse_ids(&form.tag_ids),
    };
    match state.post_service.create(user.auth(), &user.profile, input).await {
        Ok(post) => {
            redirect_with(
                &state,
                &headers,
                &format!("/admin/posts/{}", post.id),
                NotificationKind::Success,
                "Đã tạo bài viết",
            )
            .await
        }
        Err(e) => redirect_with(&state, &headers, "/admin/posts/new", NotificationKind::Error, e.user_message()).await,
    }
}

/// POST /admin/posts/{id}
async fn update_post(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<PostForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/posts");
    let input = UpdatePostInput {
        title: Some(form.title),
        description: form.description,
        thumbnail: form.thumbnail,
        content: form.body.as_deref().map(BlockDocument::from_paragraphs),
        post_type: parse_optional(&form.post_type),
        tag_ids: Some(parse_ids(&form.tag_ids)),
    };
    let result = state.post_service.update(user.auth(), id, input).await;
    finish(&state, &headers, &format!("/admin/posts/{}", id), result, "Đã lưu bài viết").await
}

/// POST /admin/posts/{id}/publish
async fn publish_post(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<PublishForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/posts");
    let result = state.post_service.set_published(user.auth(), id, form.value()).await;
    finish(&state, &headers, "/admin/posts", result, "Đã cập nhật trạng thái xuất bản").await
}

/// POST /admin/posts/{id}/delete
async fn delete_post(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/posts");
    let result = state.post_service.delete(user.auth(), id).await;
    finish(&state, &headers, "/admin/posts", result, "Đã xóa bài viết").await
}

// ============================================================================
// Tags and skills
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NamedForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
}

/// GET /admin/tags
async fn tags(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/tags");
    let filter = TagFilter {
        search: query.search(),
        published: parse_optional(&query.published),
    };
    let mut page = Page::new(&state, &headers, "/admin/tags", Some(&user));
    page.insert("query", &FilterEcho::from(&query));
    match state.tag_service.list(user.auth(), &filter, &query.params(&state)).await {
        Ok(result) => {
            page.insert("pager", &Pager::new(&result, &query.filters()));
            page.insert("tags", &result.items);
        }
        Err(e) => page.report("tags", &e).await,
    }
    page.render("admin/tags.html").await
}

/// POST /admin/tags
async fn create_tag(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Form(form): Form<NamedForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/tags");
    let input = CreateTagInput {
        name: form.name,
        description: non_blank(&form.description),
        published: checked(&form.published),
    };
    let result = state.tag_service.create(user.auth(), input).await;
    finish(&state, &headers, "/admin/tags", result, "Đã tạo thẻ").await
}

/// POST /admin/tags/{id}
async fn update_tag(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<NamedForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/tags");
    let input = UpdateTagInput {
        name: Some(form.name),
        description: form.description,
        published: None,
    };
    let result = state.tag_service.update(user.auth(), id, input).await;
    finish(&state, &headers, "/admin/tags", result, "Đã lưu thẻ").await
}

/// POST /admin/tags/{id}/publish
async fn publish_tag(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<PublishForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/tags");
    let result = state.tag_service.set_published(user.auth(), id, form.value()).await;
    finish(&state, &headers, "/admin/tags", result, "Đã cập nhật trạng thái hiển thị").await
}

/// POST /admin/tags/{id}/delete
async fn delete_tag(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/tags");
    let result = state.tag_service.delete(user.auth(), id).await;
    finish(&state, &headers, "/admin/tags", result, "Đã xóa thẻ").await
}

/// GET /admin/skills
async fn skills(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/skills");
    let search = query.search();
    let mut page = Page::new(&state, &headers, "/admin/skills", Some(&user));
    page.insert("query", &FilterEcho::from(&query));
    match state
        .skill_service
        .admin_list(user.auth(), search.as_deref(), &query.params(&state))
        .await
    {
        Ok(result) => {
            page.insert("pager", &Pager::new(&result, &query.filters()));
            page.insert("skills", &result.items);
        }
        Err(e) => page.report("skills", &e).await,
    }
    page.render("admin/skills.html").await
}

fn skill_input(form: NamedForm) -> SkillInput {
    SkillInput {
        name: form.name,
        description: non_blank(&form.description),
        published: checked(&form.published),
    }
}

/// POST /admin/skills
async fn create_skill(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Form(form): Form<NamedForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/skills");
    let result = state.skill_service.create(user.auth(), skill_input(form)).await;
    finish(&state, &headers, "/admin/skills", result, "Đã tạo kỹ năng").await
}

/// POST /admin/skills/{id}
async fn update_skill(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<NamedForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/skills");
    let result = state.skill_service.update(user.auth(), id, skill_input(form)).await;
    finish(&state, &headers, "/admin/skills", result, "Đã lưu kỹ năng").await
}

/// POST /admin/skills/{id}/delete
async fn delete_skill(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/skills");
    let result = state.skill_service.delete(user.auth(), id).await;
    finish(&state, &headers, "/admin/skills", result, "Đã xóa kỹ năng").await
}

// ============================================================================
// Registrations and users
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NotesForm {
    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// GET /admin/registrations
async fn registrations(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/registrations");
    let mut page = Page::new(&state, &headers, "/admin/registrations", Some(&user));
    page.insert("query", &FilterEcho::from(&query));
    page.insert("statuses", &registration_statuses());
    match state
        .registration_service
        .admin_list(user.auth(), parse_optional(&query.status), &query.params(&state))
        .await
    {
        Ok(result) => {
            page.insert("pager", &Pager::new(&result, &query.filters()));
            page.insert("registrations", &result.items);
        }
        Err(e) => page.report("registrations", &e).await,
    }
    page.render("admin/registrations.html").await
}

/// POST /admin/registrations/{id}/approve
async fn approve_registration(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<NotesForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/registrations");
    let result = state.registration_service.approve(user.auth(), id, form.admin_notes).await;
    finish(&state, &headers, "/admin/registrations", result, "Đã duyệt đơn đăng ký").await
}

/// POST /admin/registrations/{id}/reject
async fn reject_registration(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<NotesForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/registrations");
    let result = state.registration_service.reject(user.auth(), id, form.admin_notes).await;
    finish(&state, &headers, "/admin/registrations", result, "Đã từ chối đơn đăng ký").await
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// GET /admin/users
async fn users(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<AdminListQuery>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/users");
    let filter = ProfileFilter {
        role: parse_optional(&query.role),
        search: query.search(),
    };
    let mut page = Page::new(&state, &headers, "/admin/users", Some(&user));
    page.insert("query", &FilterEcho::from(&query));
    page.insert("roles", &user_roles());
    match state.profile_service.admin_list(user.auth(), &filter, &query.params(&state)).await {
        Ok(result) => {
            page.insert("pager", &Pager::new(&result, &query.filters()));
            page.insert("users", &result.items);
        }
        Err(e) => page.report("users", &e).await,
    }
    page.render("admin/users.html").await
}

/// POST /admin/users/{id}/role
async fn set_role(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<RoleForm>,
) -> Response {
    let user = admin_or_return!(state, headers, user, "/admin/users");
    let result = match form.role.parse::<UserRole>() {
        Ok(role) => state.profile_service.set_role(user.auth(), &user.profile, id, role).await,
        Err(_) => Err(ServiceError::ValidationError("Vai trò không hợp lệ".to_string())),
    };
    finish(&state, &headers, "/admin/users", result, "Đã cập nhật vai trò").await
}

/// Filter values echoed back into the table's search form
#[derive(Debug, Default, Serialize)]
struct FilterEcho {
    search: String,
    status: String,
    published: String,
    role: String,
    post_type: String,
}

impl From<&AdminListQuery> for FilterEcho {
    fn from(query: &AdminListQuery) -> Self {
        Self {
            search: query.search.clone().unwrap_or_default(),
            status: query.status.clone().unwrap_or_default(),
            published: query.published.clone().unwrap_or_default(),
            role: query.role.clone().unwrap_or_default(),
            post_type: query.post_type.clone().unwrap_or_default(),
        }
    }
}
