//! Live search endpoints
//!
//! - GET /api/v1/search/mentors?q=
//! - GET /api/v1/search/posts?q=&type=
//!
//! Each keystroke fires a request; only the last one of a burst from the
//! same client runs, the rest answer `204 No Content`.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use super::common::{client_key, list_params, non_blank, parse_optional, ListResponse};
use super::middleware::{ApiError, AppState};
use crate::backend::AuthToken;
use crate::models::{Mentor, MentorFilter, Post, PostFilter};
use crate::services::Debounced;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "type")]
    pub post_type: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Wait out the debounce window for this client and endpoint
async fn debounce(state: &AppState, headers: &HeaderMap, endpoint: &str) -> Result<(), ApiError> {
    let Some(client) = client_key(headers) else {
        // Without a stable key there is nothing to coalesce
        return Ok(());
    };
    let key = format!("{}:{}", endpoint, client);
    match state.debouncer.settle(&key).await {
        Debounced::Proceed => Ok(()),
        Debounced::Superseded => {
            tracing::debug!("Search {} superseded", key);
            Err(ApiError::superseded())
        }
    }
}

/// GET /api/v1/search/mentors
pub async fn search_mentors(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ListResponse<Mentor>>, ApiError> {
    debounce(&state, &headers, "mentors").await?;

    let filter = MentorFilter {
        search: non_blank(&query.q),
        ..Default::default()
    };
    let params = list_params(query.page, query.per_page, state.config.ui.page_size);
    let result = state
        .mentor_service
        .list_published(&AuthToken::anonymous(), filter, &params)
        .await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/search/posts
pub async fn search_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ListResponse<Post>>, ApiError> {
    debounce(&state, &headers, "posts").await?;

    let filter = PostFilter {
        search: non_blank(&query.q),
        post_type: parse_optional(&query.post_type),
        ..Default::default()
    };
    let params = list_params(query.page, query.per_page, state.config.ui.page_size);
    let result = state
        .post_service
        .list_published(&AuthToken::anonymous(), filter, &params)
        .await?;
    Ok(Json(result.into()))
}
