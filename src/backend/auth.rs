//! Auth gateway
//!
//! Thin wrapper over the hosted auth service. Credentials are checked,
//! confirmation codes are issued and sessions are minted remotely; this
//! module only shapes requests and decodes sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::client::{decode_body, execute, AuthToken, BackendClient};
use super::error::BackendError;

/// User record owned by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: Value,
}

/// Tokens returned by a successful sign-in, verification or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
    pub user: AuthUser,
}

/// Result of a sign-up
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Auto-confirmed projects sign the user in immediately
    SignedIn(AuthSession),
    /// A confirmation code was mailed to the address
    ConfirmationRequired(AuthUser),
}

/// Purpose of a one-time code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OtpType {
    #[default]
    Signup,
    Recovery,
    Email,
}

/// Registration request, including profile metadata copied into `profiles`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Operations of the hosted auth service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, BackendError>;

    async fn verify_otp(&self, email: &str, token: &str, kind: OtpType) -> Result<AuthSession, BackendError>;

    async fn resend_otp(&self, email: &str, kind: OtpType) -> Result<(), BackendError>;

    /// Mail a recovery code for a password reset
    async fn request_password_reset(&self, email: &str) -> Result<(), BackendError>;

    async fn update_password(&self, auth: &AuthToken, password: &str) -> Result<AuthUser, BackendError>;

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, BackendError>;

    async fn sign_out(&self, auth: &AuthToken) -> Result<(), BackendError>;

    /// Resolve an access token to its user; fails for expired tokens
    async fn get_user(&self, auth: &AuthToken) -> Result<AuthUser, BackendError>;
}

/// REST implementation against `/auth/v1`
pub struct RestAuthProvider {
    client: BackendClient,
}

impl RestAuthProvider {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn AuthProvider> {
        Arc::new(Self::new(client))
    }

    async fn post_json(&self, path: &str, auth: &AuthToken, body: Value) -> Result<String, BackendError> {
        let builder = self.client.request(Method::POST, path, auth).json(&body);
        Ok(execute(builder).await?.text().await?)
    }
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let body = self
            .post_json(
                "/auth/v1/token?grant_type=password",
                &AuthToken::anonymous(),
                json!({ "email": email, "password": password }),
            )
            .await?;
        decode_body(&body)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, BackendError> {
        let body = self
            .post_json(
                "/auth/v1/signup",
                &AuthToken::anonymous(),
                json!({
                    "email": request.email,
                    "password": request.password,
                    "data": { "full_name": request.full_name, "phone": request.phone },
                }),
            )
            .await?;
        parse_sign_up(&body)
    }

    async fn verify_otp(&self, email: &str, token: &str, kind: OtpType) -> Result<AuthSession, BackendError> {
        let body = self
            .post_json(
                "/auth/v1/verify",
                &AuthToken::anonymous(),
                json!({ "type": kind, "email": email, "token": token }),
            )
            .await?;
        decode_body(&body)
    }

    async fn resend_otp(&self, email: &str, kind: OtpType) -> Result<(), BackendError> {
        if kind == OtpType::Recovery {
            return self.request_password_reset(email).await;
        }
        self.post_json(
            "/auth/v1/resend",
            &AuthToken::anonymous(),
            json!({ "type": kind, "email": email }),
        )
        .await?;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), BackendError> {
        self.post_json("/auth/v1/recover", &AuthToken::anonymous(), json!({ "email": email }))
            .await?;
        Ok(())
    }

    async fn update_password(&self, auth: &AuthToken, password: &str) -> Result<AuthUser, BackendError> {
        let builder = self
            .client
            .request(Method::PUT, "/auth/v1/user", auth)
            .json(&json!({ "password": password }));
        let body = execute(builder).await?.text().await?;
        decode_body(&body)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let body = self
            .post_json(
                "/auth/v1/token?grant_type=refresh_token",
                &AuthToken::anonymous(),
                json!({ "refresh_token": refresh_token }),
            )
            .await?;
        decode_body(&body)
    }

    async fn sign_out(&self, auth: &AuthToken) -> Result<(), BackendError> {
        execute(self.client.request(Method::POST, "/auth/v1/logout", auth)).await?;
        Ok(())
    }

    async fn get_user(&self, auth: &AuthToken) -> Result<AuthUser, BackendError> {
        let body = execute(self.client.request(Method::GET, "/auth/v1/user", auth))
            .await?
            .text()
            .await?;
        decode_body(&body)
    }
}

/// A sign-up body is a session when confirmation is off, otherwise the bare
/// user (older servers wrap it in `user`)
fn parse_sign_up(body: &str) -> Result<SignUpOutcome, BackendError> {
    let value: Value = decode_body(body)?;
    if value.get("access_token").is_some() {
        let session = serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))?;
        return Ok(SignUpOutcome::SignedIn(session));
    }
    let user_value = match value.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => value,
    };
    let user = serde_json::from_value(user_value).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(SignUpOutcome::ConfirmationRequired(user))
}
