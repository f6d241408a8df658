//! Friendly error messages
//!
//! Backend messages are English and technical. Users see a Vietnamese
//! phrase picked by substring match, or a generic fallback.

use crate::backend::BackendError;

pub const GENERIC_ERROR: &str = "Đã có lỗi xảy ra. Vui lòng thử lại sau.";
pub const SESSION_EXPIRED: &str = "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại.";
pub const PERMISSION_DENIED: &str = "Bạn không có quyền thực hiện thao tác này.";
pub const NOT_FOUND: &str = "Không tìm thấy dữ liệu yêu cầu.";

/// First match wins; patterns are compared lowercase
const PHRASES: &[(&str, &str)] = &[
    ("invalid login credentials", "Email hoặc mật khẩu không đúng"),
    ("user already registered", "Email đã được đăng ký"),
    ("already been registered", "Email đã được đăng ký"),
    ("email not confirmed", "Email chưa được xác thực. Vui lòng kiểm tra hộp thư."),
    ("token has expired or is invalid", "Mã xác thực không đúng hoặc đã hết hạn"),
    ("otp_expired", "Mã xác thực không đúng hoặc đã hết hạn"),
    ("for security purposes", "Bạn thao tác quá nhanh. Vui lòng đợi một lát rồi thử lại."),
    ("rate limit", "Bạn thao tác quá nhanh. Vui lòng đợi một lát rồi thử lại."),
    ("password should be at least", "Mật khẩu phải có ít nhất 6 ký tự"),
    ("weak password", "Mật khẩu quá yếu"),
    ("new password should be different", "Mật khẩu mới phải khác mật khẩu cũ"),
    ("unable to validate email address", "Email không hợp lệ"),
    ("user not found", "Không tìm thấy tài khoản"),
    ("jwt expired", SESSION_EXPIRED),
    ("duplicate key", "Dữ liệu đã tồn tại"),
    ("row-level security", PERMISSION_DENIED),
    ("permission denied", PERMISSION_DENIED),
    ("violates foreign key", "Dữ liệu đang được sử dụng, không thể xóa"),
    ("payload too large", "Tệp quá lớn"),
    ("mime type", "Định dạng tệp không được hỗ trợ"),
];

/// Vietnamese phrase for a raw backend message
pub fn friendly_message(raw: &str) -> &'static str {
    let lower = raw.to_lowercase();
    PHRASES
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, phrase)| *phrase)
        .unwrap_or(GENERIC_ERROR)
}

/// Vietnamese phrase for a backend error, by status when the message is unknown
pub fn friendly_backend_error(err: &BackendError) -> &'static str {
    let by_message = friendly_message(&err.message());
    if by_message != GENERIC_ERROR {
        return by_message;
    }
    if err.is_unauthorized() {
        SESSION_EXPIRED
    } else if err.is_forbidden() {
        PERMISSION_DENIED
    } else if matches!(err, BackendError::NotFound) {
        NOT_FOUND
    } else {
        GENERIC_ERROR
    }
}
