//! Post API endpoints
//!
//! Handles HTTP requests for the public blog and activity feed:
//! - GET /api/v1/posts - Published posts (type, tag, search, paged)
//! - GET /api/v1/posts/{id} - Published post with rendered content
//! - GET /api/v1/posts/{id}/comments - Comment tree
//! - POST /api/v1/posts/{id}/comments - Add a comment or reply (auth)
//! - DELETE /api/v1/comments/{id} - Soft delete (owner or admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{list_params, non_blank, parse_optional, ListResponse};
use super::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::backend::AuthToken;
use crate::models::{Comment, CommentNode, CreateCommentInput, ListParams, Post, PostFilter};
use crate::services::render_document;

/// Query parameters for post listings
#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    #[serde(default, rename = "type")]
    pub post_type: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl PostListQuery {
    pub fn params(&self, default_per_page: u32) -> ListParams {
        list_params(self.page, self.per_page, default_per_page)
    }

    pub fn filter(&self) -> PostFilter {
        PostFilter {
            post_type: parse_optional(&self.post_type),
            published: None,
            search: non_blank(&self.search),
            tag_id: parse_optional(&self.tag),
        }
    }
}

/// Post with its blocks rendered to HTML
#[derive(Debug, Serialize)]
pub struct PostResponse {
    #[serde(flatten)]
    pub post: Post,
    pub content_html: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        let content_html = render_document(&post.content);
        Self { post, content_html }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentTreeResponse {
    pub comments: Vec<CommentNode>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentBody {
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<Uuid>,
}

/// GET /api/v1/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<ListResponse<Post>>, ApiError> {
    let params = query.params(state.config.ui.page_size);
    let result = state
        .post_service
        .list_published(&AuthToken::anonymous(), query.filter(), &params)
        .await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.post_service.get_published(&AuthToken::anonymous(), id).await?;
    Ok(Json(post.into()))
}

/// GET /api/v1/posts/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<CommentTreeResponse>, ApiError> {
    let comments = state
        .comment_service
        .list_tree(&AuthToken::anonymous(), post_id)
        .await?;
    let total = comments.iter().map(CommentNode::count).sum();
    Ok(Json(CommentTreeResponse { comments, total }))
}

/// POST /api/v1/posts/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<Uuid>,
    Json(body): Json<CreateCommentBody>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let input = CreateCommentInput {
        post_id,
        parent_comment_id: body.parent_comment_id,
        content: body.content,
    };
    let comment = state
        .comment_service
        .create(user.auth(), &user.profile, input)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .comment_service
        .delete(user.auth(), &user.profile, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
