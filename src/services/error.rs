//! Error type shared by the entity services

use super::messages::{friendly_backend_error, NOT_FOUND, PERMISSION_DENIED};
use super::validation::FieldError;
use crate::backend::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input rejected before reaching the backend
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Signed in, but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing or expired credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<FieldError> for ServiceError {
    fn from(err: FieldError) -> Self {
        ServiceError::ValidationError(err.message)
    }
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{} không tồn tại", what))
    }

    pub fn forbidden() -> Self {
        ServiceError::Forbidden(PERMISSION_DENIED.to_string())
    }

    /// Message safe to show to the user
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::ValidationError(msg)
            | ServiceError::Forbidden(msg)
            | ServiceError::Unauthorized(msg)
            | ServiceError::Conflict(msg) => msg.clone(),
            ServiceError::NotFound(msg) if !msg.is_empty() => msg.clone(),
            ServiceError::NotFound(_) => NOT_FOUND.to_string(),
            ServiceError::Backend(err) => friendly_backend_error(err).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::messages::GENERIC_ERROR;

    #[test]
    fn test_user_message() {
        let err: ServiceError = FieldError::new("email", "Email không hợp lệ").into();
        assert_eq!(err.user_message(), "Email không hợp lệ");
        assert_eq!(ServiceError::not_found("Bài viết").user_message(), "Bài viết không tồn tại");
        assert_eq!(ServiceError::forbidden().user_message(), PERMISSION_DENIED);

        let err = ServiceError::Backend(BackendError::Decode("bad".to_string()));
        assert_eq!(err.user_message(), GENERIC_ERROR);
    }
}
