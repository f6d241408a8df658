//! API layer - HTTP handlers and routing
//!
//! This module contains the JSON API served under `/api/v1`:
//! - Auth endpoints (sign-in, sign-up, OTP, password reset, refresh)
//! - Account endpoints (profile, avatar, mentor registration, bookings)
//! - Public content (posts, comments, mentors, skills, tags)
//! - Debounced live search
//! - Admin CRUD panels
//!
//! The HTML pages from `crate::web` are merged into the same router.

pub mod account;
pub mod admin;
pub mod auth;
pub mod common;
pub mod mentors;
pub mod middleware;
pub mod posts;
pub mod search;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/account", account::router())
        .route("/posts/{id}/comments", axum::routing::post(posts::create_comment))
        .route("/comments/{id}", delete(posts::delete_comment))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/posts/{id}/comments", get(posts::list_comments))
        .route("/mentors", get(mentors::list_mentors))
        .route("/mentors/{id}", get(mentors::get_mentor))
        .route("/skills", get(mentors::list_skills))
        .route("/tags", get(mentors::list_tags))
        .route("/search/mentors", get(search::search_mentors))
        .route("/search/posts", get(search::search_posts))
        .merge(admin_routes)
        .merge(protected_routes)
}

/// CORS for the configured origin, with cookies allowed
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(e) => {
            tracing::warn!("Invalid cors_origin '{}': {}, cross-origin requests disabled", origin, e);
            layer
        }
    }
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .merge(crate::web::router(state.clone()))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
