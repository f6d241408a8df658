//! Hosted backend access layer
//!
//! All persistence, authentication and file storage live in a hosted
//! backend-as-a-service. This module provides:
//! - `BackendClient`: shared HTTP client for tables and procedures
//! - `AuthProvider` / `ObjectStorage`: auth and storage gateways
//! - `repositories`: one trait per entity with a REST implementation

pub mod auth;
mod client;
mod error;
pub mod query;
pub mod repositories;
pub mod storage;

pub use auth::{AuthProvider, AuthSession, AuthUser, OtpType, RestAuthProvider, SignUpOutcome, SignUpRequest};
pub use client::{AuthToken, BackendClient};
pub use error::BackendError;
pub use query::TableQuery;
pub use storage::{object_path, ObjectStorage, RestObjectStorage};
