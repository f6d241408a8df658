//! Public pages: home, about, blog, activities, mentors

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::Response,
    Form,
};
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::{redirect_with, sign_in_url, Page, Pager};
use crate::api::common::{list_params, non_blank, parse_optional};
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::backend::AuthToken;
use crate::models::{
    CreateBookingInput, CreateCommentInput, ListParams, MentorFilter, PostFilter, PostType, SessionType,
};
use crate::services::{render_document, NotificationKind, ServiceError, MAX_REPLY_DEPTH};

const HOME_POSTS: u32 = 3;
const HOME_MENTORS: u32 = 6;

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// GET /
pub async fn home(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
) -> Response {
    let anon = AuthToken::anonymous();
    let recent = ListParams::new(1, HOME_POSTS);
    let featured = ListParams::new(1, HOME_MENTORS);
    let blog_filter = PostFilter {
        post_type: Some(PostType::Blog),
        ..Default::default()
    };
    let activity_filter = PostFilter {
        post_type: Some(PostType::Activity),
        ..Default::default()
    };

    let (blog, activities, mentors) = futures::join!(
        state.post_service.list_published(&anon, blog_filter, &recent),
        state.post_service.list_published(&anon, activity_filter, &recent),
        state.mentor_service.list_published(&anon, MentorFilter::default(), &featured),
    );

    let mut page = Page::new(&state, &headers, "/", user.as_ref());
    match blog {
        Ok(result) => page.insert("blog_posts", &result.items),
        Err(e) => page.report("home blog posts", &e).await,
    }
    match activities {
        Ok(result) => page.insert("activities", &result.items),
        Err(e) => page.report("home activities", &e).await,
    }
    match mentors {
        Ok(result) => page.insert("mentors", &result.items),
        Err(e) => page.report("home mentors", &e).await,
    }
    page.render("home.html").await
}

/// GET /about
pub async fn about(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
) -> Response {
    Page::new(&state, &headers, "/about", user.as_ref())
        .render("about.html")
        .await
}

/// GET /blog
pub async fn blog(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<ListingQuery>,
) -> Response {
    post_listing(&state, user.as_ref(), &headers, "/blog", PostType::Blog, query).await
}

/// GET /activities
pub async fn activities(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<ListingQuery>,
) -> Response {
    post_listing(&state, user.as_ref(), &headers, "/activities", PostType::Activity, query).await
}

async fn post_listing(
    state: &AppState,
    user: Option<&AuthenticatedUser>,
    headers: &HeaderMap,
    path: &str,
    post_type: PostType,
    query: ListingQuery,
) -> Response {
    let anon = AuthToken::anonymous();
    let params = list_params(query.page, None, state.config.ui.page_size);
    let filter = PostFilter {
        post_type: Some(post_type),
        search: non_blank(&query.q),
        tag_id: parse_optional(&query.tag),
        ..Default::default()
    };

    let (posts, tags) = futures::join!(
        state.post_service.list_published(&anon, filter, &params),
        state.tag_service.list_published(&anon),
    );

    let mut page = Page::new(state, headers, path, user);
    page.insert("post_type", &post_type);
    page.insert("q", &query.q.clone().unwrap_or_default());
    page.insert("selected_tag", &query.tag.clone().unwrap_or_default());
    match posts {
        Ok(result) => {
            page.insert(
                "pager",
                &Pager::new(&result, &[("q", query.q.as_deref()), ("tag", query.tag.as_deref())]),
            );
            page.insert("posts", &result.items);
        }
        Err(e) => page.report("posts", &e).await,
    }
    match tags {
        Ok(tags) => page.insert("tags", &tags),
        Err(e) => page.report("tags", &e).await,
    }
    page.render("posts.html").await
}

/// GET /blog/{id}
pub async fn post_detail(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    uri: Uri,
    Path(id): Path<Uuid>,
) -> Response {
    let anon = AuthToken::anonymous();
    let mut page = Page::new(&state, &headers, uri.path(), user.as_ref());

    let post = match state.post_service.get_published(&anon, id).await {
        Ok(post) => post,
        Err(e) => {
            page.report("post", &e).await;
            return page.render("not_found.html").await;
        }
    };

    match state.comment_service.list_tree(&anon, id).await {
        Ok(comments) => {
            let total: usize = comments.iter().map(|c| c.count()).sum();
            page.insert("comments", &comments);
            page.insert("comment_total", &total);
            page.insert("max_reply_depth", &MAX_REPLY_DEPTH);
        }
        Err(e) => page.report("comments", &e).await,
    }

    page.insert("content_html", &render_document(&post.content));
    page.insert("post", &post);
    page.render("post.html").await
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

/// POST /blog/{id}/comments
pub async fn post_comment(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<CommentForm>,
) -> Response {
    let back = format!("/blog/{}#comments", id);
    let Some(user) = user else {
        return redirect_with(
            &state,
            &headers,
            &sign_in_url(&format!("/blog/{}", id)),
            NotificationKind::Info,
            "Vui lòng đăng nhập để bình luận",
        )
        .await;
    };

    let input = CreateCommentInput {
        post_id: id,
        parent_comment_id: parse_optional(&form.parent_comment_id),
        content: form.content,
    };
    match state.comment_service.create(user.auth(), &user.profile, input).await {
        Ok(_) => redirect_with(&state, &headers, &back, NotificationKind::Success, "Đã gửi bình luận").await,
        Err(e) => redirect_with(&state, &headers, &back, NotificationKind::Error, e.user_message()).await,
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteCommentForm {
    pub post_id: Uuid,
}

/// POST /comments/{id}/delete
pub async fn delete_comment(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<DeleteCommentForm>,
) -> Response {
    let back = format!("/blog/{}#comments", form.post_id);
    let Some(user) = user else {
        return redirect_with(&state, &headers, &sign_in_url(&back), NotificationKind::Info, "Vui lòng đăng nhập").await;
    };
    match state.comment_service.delete(user.auth(), &user.profile, id).await {
        Ok(()) => redirect_with(&state, &headers, &back, NotificationKind::Success, "Đã xóa bình luận").await,
        Err(e) => redirect_with(&state, &headers, &back, NotificationKind::Error, e.user_message()).await,
    }
}

/// GET /mentors
pub async fn mentors(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Query(query): Query<ListingQuery>,
) -> Response {
    let anon = AuthToken::anonymous();
    let params = list_params(query.page, None, state.config.ui.page_size);
    let filter = MentorFilter {
        search: non_blank(&query.q),
        skill_id: parse_optional(&query.skill),
        ..Default::default()
    };

    let (mentors, skills) = futures::join!(
        state.mentor_service.list_published(&anon, filter, &params),
        state.skill_service.list_published(&anon),
    );

    let mut page = Page::new(&state, &headers, "/mentors", user.as_ref());
    page.insert("q", &query.q.clone().unwrap_or_default());
    page.insert("selected_skill", &query.skill.clone().unwrap_or_default());
    match mentors {
        Ok(result) => {
            page.insert(
                "pager",
                &Pager::new(&result, &[("q", query.q.as_deref()), ("skill", query.skill.as_deref())]),
            );
            page.insert("mentors", &result.items);
        }
        Err(e) => page.report("mentors", &e).await,
    }
    match skills {
        Ok(skills) => page.insert("skills", &skills),
        Err(e) => page.report("skills", &e).await,
    }
    page.render("mentors.html").await
}

/// GET /mentors/{id}
pub async fn mentor_detail(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    uri: Uri,
    Path(id): Path<Uuid>,
) -> Response {
    let mut page = Page::new(&state, &headers, uri.path(), user.as_ref());
    match state
        .mentor_service
        .get_detail(&AuthToken::anonymous(), id, true)
        .await
    {
        Ok(detail) => {
            page.insert("detail", &detail);
            page.render("mentor.html").await
        }
        Err(e) => {
            page.report("mentor", &e).await;
            page.render("not_found.html").await
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub session_type: Option<String>,
    /// `datetime-local` input value
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

fn parse_local_datetime(value: &str) -> Result<chrono::DateTime<Utc>, ServiceError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map(|dt| dt.and_utc())
        .map_err(|_| ServiceError::ValidationError("Thời gian hẹn không hợp lệ".to_string()))
}

/// POST /mentors/{id}/book
pub async fn book_mentor(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Form(form): Form<BookingForm>,
) -> Response {
    let back = format!("/mentors/{}", id);
    let Some(user) = user else {
        return redirect_with(
            &state,
            &headers,
            &sign_in_url(&back),
            NotificationKind::Info,
            "Vui lòng đăng nhập để đặt lịch",
        )
        .await;
    };

    let scheduled_at = match non_blank(&form.scheduled_at).map(|v| parse_local_datetime(&v)).transpose() {
        Ok(at) => at,
        Err(e) => return redirect_with(&state, &headers, &back, NotificationKind::Error, e.user_message()).await,
    };
    let input = CreateBookingInput {
        mentor_id: id,
        session_type: parse_optional::<SessionType>(&form.session_type).unwrap_or_default(),
        scheduled_at,
        note: form.note,
    };

    match state.booking_service.create(user.auth(), &user.profile, input).await {
        Ok(_) => {
            redirect_with(
                &state,
                &headers,
                "/account#bookings",
                NotificationKind::Success,
                "Đã gửi yêu cầu đặt lịch, mentor sẽ sớm xác nhận",
            )
            .await
        }
        Err(e) => redirect_with(&state, &headers, &back, NotificationKind::Error, e.user_message()).await,
    }
}

/// Fallback for unknown paths
pub async fn not_found(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let mut page = Page::new(&state, &headers, uri.path(), None);
    page.status(StatusCode::NOT_FOUND);
    page.render("not_found.html").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_datetime() {
        let at = parse_local_datetime("2026-11-02T09:30").unwrap();
        assert_eq!(at.to_rfc3339(), "2026-11-02T09:30:00+00:00");
        assert!(parse_local_datetime("02/11/2026").is_err());
    }
}
