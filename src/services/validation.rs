//! Form validation
//!
//! Field checks shared by the JSON API and the HTML forms. Failures carry
//! the Vietnamese message shown to the user.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const OTP_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex"));

/// A rejected field with its user-facing message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.trim().is_empty() {
        return Err(FieldError::new("email", "Vui lòng nhập email"));
    }
    if !is_valid_email(email) {
        return Err(FieldError::new("email", "Email không hợp lệ"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.is_empty() {
        return Err(FieldError::new("password", "Vui lòng nhập mật khẩu"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(
            "password",
            format!("Mật khẩu phải có ít nhất {} ký tự", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

/// Password plus its confirmation field
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), FieldError> {
    validate_password(password)?;
    if password != confirm {
        return Err(FieldError::new("confirm_password", "Mật khẩu xác nhận không khớp"));
    }
    Ok(())
}

/// Exactly six ASCII digits
pub fn validate_otp(code: &str) -> Result<(), FieldError> {
    let code = code.trim();
    if code.len() != OTP_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::new(
            "otp",
            format!("Mã xác thực phải gồm {} chữ số", OTP_LEN),
        ));
    }
    Ok(())
}

/// Non-blank after trimming
pub fn require(field: &'static str, label: &str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, format!("Vui lòng nhập {}", label)));
    }
    Ok(())
}

/// Trim and drop blank optional text
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_email() {
        assert!(validate_email("mentee@hrcompanion.vn").is_ok());
        assert!(validate_email("  a.b+c@d.co  ").is_ok());
        assert_eq!(validate_email("").unwrap_err().message, "Vui lòng nhập email");
        for bad in ["plain", "a@b", "a b@c.d", "@c.d", "a@.", "a@@b.c"] {
            assert!(validate_email(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_email_pattern_builds() {
        assert_eq!(Lazy::force(&EMAIL_RE).as_str(), r"^[^\s@]+@[^\s@]+\.[^\s@]+$");
        assert!(is_valid_email("admin@hrcompanion.vn"));
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("mậtkhẩ").is_ok());
        let err = validate_new_password("secret1", "secret2").unwrap_err();
        assert_eq!(err.field, "confirm_password");
        assert!(validate_new_password("secret1", "secret1").is_ok());
        assert_eq!(validate_new_password("abc", "abc").unwrap_err().field, "password");
    }

    #[test]
    fn test_otp() {
        assert!(validate_otp("012345").is_ok());
        assert!(validate_otp(" 987654 ").is_ok());
        for bad in ["", "12345", "1234567", "12a456", "１２３４５６"] {
            assert!(validate_otp(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_require_and_normalize() {
        assert!(require("full_name", "họ tên", "  ").is_err());
        assert_eq!(
            require("full_name", "họ tên", "").unwrap_err().message,
            "Vui lòng nhập họ tên"
        );
        assert!(require("full_name", "họ tên", "An").is_ok());
        assert_eq!(normalize_optional(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(normalize_optional(None), None);
    }

    proptest! {
        #[test]
        fn prop_six_digits_always_accepted(code in "[0-9]{6}") {
            prop_assert!(validate_otp(&code).is_ok());
        }

        #[test]
        fn prop_wrong_length_rejected(code in "[0-9]{0,5}|[0-9]{7,10}") {
            prop_assert!(validate_otp(&code).is_err());
        }

        #[test]
        fn prop_whitespace_in_email_rejected(local in "[a-z]{1,8}", domain in "[a-z]{1,8}") {
            let email = format!("{} x@{}.vn", local, domain);
            prop_assert!(!is_valid_email(&email));
        }
    }
}
