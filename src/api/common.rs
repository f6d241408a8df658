//! Common API utilities and shared types
//!
//! This module contains shared utilities used across the JSON handlers and
//! the HTML pages: pagination queries, list envelopes, session cookies and
//! the per-client key used by the notification centre and the debouncer.

use axum::extract::Multipart;
use axum::http::{header, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::middleware::ApiError;
use crate::backend::AuthSession;
use crate::models::{ListParams, PagedResult};

/// Cookie carrying the access token
pub const SESSION_COOKIE: &str = "session";
/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";
/// Anonymous client id used to key notifications and searches
pub const CLIENT_COOKIE: &str = "nid";

const REFRESH_MAX_AGE: i64 = 30 * 24 * 60 * 60;

// ============================================================================
// Pagination
// ============================================================================

/// Basic pagination query parameters; `per_page` falls back to the configured size
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl PaginationQuery {
    pub fn params(&self, default_per_page: u32) -> ListParams {
        list_params(self.page, self.per_page, default_per_page)
    }
}

/// Paging from optional query values
pub fn list_params(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> ListParams {
    ListParams::new(page.unwrap_or(1), per_page.unwrap_or(default_per_page))
}

/// Paged list envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> From<PagedResult<T>> for ListResponse<T> {
    fn from(result: PagedResult<T>) -> Self {
        let total_pages = result.total_pages();
        Self {
            items: result.items,
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
        }
    }
}

/// Query parameter that may be present but blank, as HTML forms send it
pub fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse an optional query value, treating blanks as absent
pub fn parse_optional<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
    non_blank(value).and_then(|s| s.parse().ok())
}

// ============================================================================
// Cookies
// ============================================================================

/// Read a cookie by name
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn append_cookie(headers: &mut HeaderMap, cookie: String) {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!("Dropping malformed cookie: {}", e),
    }
}

/// `Set-Cookie` headers persisting a session
pub fn session_cookies(session: &AuthSession, secure: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let max_age = if session.expires_in > 0 { session.expires_in } else { 3600 };
    append_cookie(&mut headers, cookie(SESSION_COOKIE, &session.access_token, max_age, secure));
    append_cookie(
        &mut headers,
        cookie(REFRESH_COOKIE, &session.refresh_token, REFRESH_MAX_AGE, secure),
    );
    headers
}

/// `Set-Cookie` headers removing the session
pub fn clear_session_cookies(secure: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, cookie(SESSION_COOKIE, "", 0, secure));
    append_cookie(&mut headers, cookie(REFRESH_COOKIE, "", 0, secure));
    headers
}

/// Stable key for the calling client: its anonymous id, else its session
pub fn client_key(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, CLIENT_COOKIE).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
            .or_else(|| read_cookie(headers, SESSION_COOKIE))
    })
}

/// Client key, minting a new `nid` cookie when the client has none
pub fn ensure_client_key(headers: &HeaderMap, response_headers: &mut HeaderMap) -> String {
    if let Some(key) = read_cookie(headers, CLIENT_COOKIE) {
        return key;
    }
    let key = uuid::Uuid::new_v4().to_string();
    append_cookie(
        response_headers,
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", CLIENT_COOKIE, key),
    );
    key
}

// ============================================================================
// Uploads
// ============================================================================

/// Uploaded file from a multipart `file` field
pub struct UploadedFile {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Read the `file` field of a multipart body
pub async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;
        return Ok(UploadedFile {
            content_type,
            data: data.to_vec(),
        });
    }
    Err(ApiError::validation_error("Vui lòng chọn tệp"))
}
