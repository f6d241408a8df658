//! Template rendering
//!
//! Templates are embedded at build time and loaded into one Tera instance.
//! Every page gets the standard variables (site name, request path, year,
//! current user) plus the notifications queued for the calling client.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use chrono::Datelike;
use rust_embed::RustEmbed;
use serde::Serialize;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};
use uuid::Uuid;

use super::TemplateError;
use crate::api::common::ensure_client_key;
use crate::api::middleware::{AppState, AuthenticatedUser};
use crate::models::{PageItem, PagedResult, Profile, UserRole};
use crate::services::ServiceError;

pub const SITE_NAME: &str = "HR Companion";

#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct TemplateAssets;

/// Tera instance over the embedded templates
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Parse every embedded template
    pub fn load() -> Result<Self, TemplateError> {
        let mut templates = Vec::new();
        for name in TemplateAssets::iter() {
            let Some(file) = TemplateAssets::get(&name) else {
                continue;
            };
            let source = String::from_utf8(file.data.into_owned())
                .map_err(|_| TemplateError::Encoding(name.to_string()))?;
            templates.push((name.to_string(), source));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| TemplateError::Render(error_chain("templates", &e)))?;
        tracing::debug!("Loaded {} templates", tera.get_template_names().count());
        Ok(Self { tera })
    }

    /// Like `load`, but falls back to an empty set so pages degrade to the error page
    pub fn embedded() -> Self {
        match Self::load() {
            Ok(renderer) => renderer,
            Err(e) => {
                tracing::error!("Failed to load templates: {}", e);
                Self { tera: Tera::default() }
            }
        }
    }

    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, TemplateError> {
        self.tera
            .render(template, context)
            .map_err(|e| TemplateError::Render(error_chain(template, &e)))
    }

    /// Render, falling back to `error.html` and then to a bare HTML page
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> String {
        match self.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("{}, trying error template", e);
                let mut error_context = context.clone();
                error_context.insert("error_message", &e.to_string());
                match self.render("error.html", &error_context) {
                    Ok(html) => html,
                    Err(inner) => {
                        tracing::warn!("Failed to render error template: {}", inner);
                        simple_error_page(&e.to_string())
                    }
                }
            }
        }
    }
}

fn error_chain(template: &str, err: &tera::Error) -> String {
    let mut message = format!("Failed to render '{}': {}", template, err);
    let mut source = err.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

fn simple_error_page(error: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="vi">
<head><meta charset="UTF-8"><title>{}</title></head>
<body><h1>Đã có lỗi xảy ra</h1><pre>{}</pre></body>
</html>"#,
        SITE_NAME,
        crate::services::content::html_escape(error)
    )
}

/// Signed-in user as templates see it
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub can_manage_roles: bool,
}

impl From<&Profile> for CurrentUser {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.display_name().to_string(),
            email: profile.email.clone(),
            role: profile.role,
            avatar_url: profile.avatar_url.clone(),
            is_admin: profile.is_admin(),
            can_manage_roles: profile.role.can_manage_roles(),
        }
    }
}

/// Page strip state for list templates
#[derive(Debug, Serialize)]
pub struct Pager {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub items: Vec<PageItem>,
    /// Current filters as a query string, without `page`
    pub query: String,
}

impl Pager {
    pub fn new<T>(result: &PagedResult<T>, filters: &[(&str, Option<&str>)]) -> Self {
        let total_pages = result.total_pages();
        Self {
            page: result.page,
            total_pages,
            total: result.total,
            items: result.window(),
            query: query_string(filters),
        }
    }
}

/// `a=1&b=2` from the non-blank pairs, values percent-encoded
pub fn query_string(pairs: &[(&str, Option<&str>)]) -> String {
    pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// One HTML response in the making
pub struct Page<'a> {
    state: &'a AppState,
    context: TeraContext,
    headers: HeaderMap,
    client: String,
    status: StatusCode,
}

impl<'a> Page<'a> {
    pub fn new(
        state: &'a AppState,
        request_headers: &HeaderMap,
        path: &str,
        user: Option<&AuthenticatedUser>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        let client = ensure_client_key(request_headers, &mut headers);

        let mut context = TeraContext::new();
        context.insert("site_name", SITE_NAME);
        context.insert("request_path", path);
        context.insert("year", &chrono::Utc::now().year());
        if let Some(user) = user {
            context.insert("current_user", &CurrentUser::from(&user.profile));
        }

        Self {
            state,
            context,
            headers,
            client,
            status: StatusCode::OK,
        }
    }

    pub fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.context.insert(key, value);
    }

    pub fn status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Show a failed load as an error notification on this page
    pub async fn report(&mut self, what: &str, err: &ServiceError) {
        tracing::warn!("Failed to load {}: {}", what, err);
        if matches!(err, ServiceError::NotFound(_)) {
            self.status = StatusCode::NOT_FOUND;
        }
        self.state
            .notifications
            .error(&self.client, err.user_message())
            .await;
    }

    pub async fn render(mut self, template: &str) -> Response {
        let notifications = self.state.notifications.take(&self.client).await;
        self.context.insert("notifications", &notifications);
        let html = self.state.renderer.render_with_fallback(template, &self.context);
        (self.status, self.headers, Html(html)).into_response()
    }
}
