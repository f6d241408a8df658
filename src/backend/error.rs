//! Errors raised at the hosted backend boundary

use reqwest::StatusCode;
use serde_json::Value;

/// Error returned by any call to the hosted backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response
    #[error("Request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    /// A single-row call found nothing
    #[error("Record not found")]
    NotFound,
}

impl BackendError {
    /// Build an API error from a status and raw response body.
    ///
    /// REST errors carry `message`/`code`, auth errors carry `msg` or
    /// `error_description`/`error`, storage errors carry `message`/`error`.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let field = |key: &str| -> Option<String> {
            parsed
                .as_ref()
                .and_then(|v| v.get(key))
                .and_then(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
        };

        let message = field("message")
            .or_else(|| field("msg"))
            .or_else(|| field("error_description"))
            .or_else(|| field("error"))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });
        let code = field("error_code").or_else(|| field("code"));

        BackendError::Api {
            status: status.as_u16(),
            code,
            message,
        }
    }

    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            BackendError::NotFound => Some(404),
            _ => None,
        }
    }

    /// Raw backend message, used for friendly-message matching
    pub fn message(&self) -> String {
        match self {
            BackendError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// The caller's token was missing, expired or rejected
    pub fn is_unauthorized(&self) -> bool {
        match self {
            BackendError::Api { status: 401, .. } => true,
            BackendError::Api { message, .. } => message.contains("JWT expired"),
            _ => false,
        }
    }

    /// Row-level security or a procedure refused the call
    pub fn is_forbidden(&self) -> bool {
        matches!(self, BackendError::Api { status: 403, .. })
            || matches!(self, BackendError::Api { code: Some(code), .. } if code == "42501")
    }

    /// Unique-constraint violation
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::Api { status: 409, .. })
            || matches!(self, BackendError::Api { code: Some(code), .. } if code == "23505")
    }
}
