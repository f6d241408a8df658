//! Authentication service
//!
//! Validates form input, then delegates to the hosted auth provider.
//! Sessions are the provider's access tokens; resolving one yields the
//! caller's profile row.

use std::sync::Arc;

use super::error::ServiceError;
use super::validation::{require, validate_email, validate_new_password, validate_otp};
use crate::backend::repositories::ProfileRepository;
use crate::backend::{AuthProvider, AuthSession, AuthToken, AuthUser, OtpType, SignUpOutcome, SignUpRequest};
use crate::models::{Profile, UserRole};

/// Authentication service
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { provider, profiles }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ServiceError> {
        validate_email(email)?;
        require("password", "mật khẩu", password)?;

        let email = normalize_email(email);
        match self.provider.sign_in(&email, password).await {
            Ok(session) => {
                tracing::info!("User {} signed in", session.user.id);
                Ok(session)
            }
            Err(e) => {
                tracing::warn!("Sign-in failed for {}: {}", email, e);
                Err(e.into())
            }
        }
    }

    /// Register; most projects answer with `ConfirmationRequired` and mail a code
    pub async fn sign_up(&self, mut request: SignUpRequest, confirm_password: &str) -> Result<SignUpOutcome, ServiceError> {
        require("full_name", "họ tên", &request.full_name)?;
        validate_email(&request.email)?;
        validate_new_password(&request.password, confirm_password)?;

        request.email = normalize_email(&request.email);
        request.full_name = request.full_name.trim().to_string();
        request.phone = super::validation::normalize_optional(request.phone);

        let outcome = self.provider.sign_up(&request).await.map_err(|e| {
            tracing::warn!("Sign-up failed for {}: {}", request.email, e);
            ServiceError::from(e)
        })?;
        tracing::info!("New account registered: {}", request.email);
        Ok(outcome)
    }

    pub async fn verify_otp(&self, email: &str, code: &str, kind: OtpType) -> Result<AuthSession, ServiceError> {
        validate_email(email)?;
        validate_otp(code)?;
        let session = self
            .provider
            .verify_otp(&normalize_email(email), code.trim(), kind)
            .await?;
        tracing::info!("OTP verified for user {}", session.user.id);
        Ok(session)
    }

    pub async fn resend_otp(&self, email: &str, kind: OtpType) -> Result<(), ServiceError> {
        validate_email(email)?;
        self.provider.resend_otp(&normalize_email(email), kind).await?;
        Ok(())
    }

    /// Mail a recovery code; the code is then checked with `verify_otp(Recovery)`
    pub async fn forgot_password(&self, email: &str) -> Result<(), ServiceError> {
        validate_email(email)?;
        self.provider
            .request_password_reset(&normalize_email(email))
            .await?;
        Ok(())
    }

    /// Set a new password for the signed-in (or recovery-verified) user
    pub async fn reset_password(
        &self,
        auth: &AuthToken,
        password: &str,
        confirm_password: &str,
    ) -> Result<AuthUser, ServiceError> {
        validate_new_password(password, confirm_password)?;
        if auth.is_anonymous() {
            return Err(ServiceError::Unauthorized(super::messages::SESSION_EXPIRED.to_string()));
        }
        let user = self.provider.update_password(auth, password).await?;
        tracing::info!("Password updated for user {}", user.id);
        Ok(user)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ServiceError> {
        if refresh_token.trim().is_empty() {
            return Err(ServiceError::Unauthorized(super::messages::SESSION_EXPIRED.to_string()));
        }
        Ok(self.provider.refresh(refresh_token).await?)
    }

    /// Revoke the session remotely; a token that is already dead is fine
    pub async fn sign_out(&self, auth: &AuthToken) -> Result<(), ServiceError> {
        match self.provider.sign_out(auth).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unauthorized() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve an access token to the caller's profile.
    ///
    /// Returns `None` for missing, expired or revoked tokens.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<Profile>, ServiceError> {
        let auth = AuthToken::bearer(token);
        let user = match self.provider.get_user(&auth).await {
            Ok(user) => user,
            Err(e) if e.is_unauthorized() || e.is_forbidden() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match self.profiles.get(&auth, user.id).await? {
            Some(profile) => Ok(Some(profile)),
            None => {
                // Profile row not created yet by the signup trigger
                tracing::warn!("No profile row for user {}", user.id);
                Ok(Some(fallback_profile(&user)))
            }
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn fallback_profile(user: &AuthUser) -> Profile {
    Profile {
        id: user.id,
        email: user.email.clone().unwrap_or_default(),
        role: UserRole::User,
        full_name: user
            .user_metadata
            .get("full_name")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        phone: None,
        date_of_birth: None,
        gender: None,
        address: None,
        bio: None,
        avatar_url: None,
        created_at: None,
        updated_at: None,
    }
}
