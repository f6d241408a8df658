//! User profile model
//!
//! Accounts live in the hosted auth service; the `profiles` table carries
//! the role and personal fields keyed by the auth user id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Profile row joined to an auth user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Auth user id
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Check if the user may enter the admin area
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name to show in headers and comment threads
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }

    /// Check if the user can moderate content written by `author_id`
    pub fn can_moderate(&self, author_id: Uuid) -> bool {
        self.is_admin() || self.id == author_id
    }
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Mentee / regular member
    #[default]
    User,
    /// Approved mentor
    Mentor,
    /// Administrator
    Admin,
    /// Administrator who may also change roles
    Superadmin,
}

impl UserRole {
    /// Admin area access
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Superadmin)
    }

    /// Only superadmins can grant or revoke roles
    pub fn can_manage_roles(self) -> bool {
        self == UserRole::Superadmin
    }

    /// Vietnamese label used by the admin tables
    pub fn label(self) -> &'static str {
        match self {
            UserRole::User => "Người dùng",
            UserRole::Mentor => "Mentor",
            UserRole::Admin => "Quản trị viên",
            UserRole::Superadmin => "Quản trị cấp cao",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Mentor => write!(f, "mentor"),
            UserRole::Admin => write!(f, "admin"),
            UserRole::Superadmin => write!(f, "superadmin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "mentor" => Ok(UserRole::Mentor),
            "admin" => Ok(UserRole::Admin),
            "superadmin" => Ok(UserRole::Superadmin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

/// Fields a user may change on their own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Filter for the admin user table
#[derive(Debug, Clone, Default)]
pub struct ProfileFilter {
    pub role: Option<UserRole>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: UserRole) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: "lan.nguyen@example.com".to_string(),
            role,
            full_name: None,
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

    #[test]
    fn test_role_roundtrip() {
        for role in [UserRole::User, UserRole::Mentor, UserRole::Admin, UserRole::Superadmin] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_admin_roles() {
        assert!(!UserRole::User.is_admin());
        assert!(!UserRole::Mentor.is_admin());
        assert!(UserRole::Admin.is_admin());
        assert!(UserRole::Superadmin.is_admin());
        assert!(!UserRole::Admin.can_manage_roles());
        assert!(UserRole::Superadmin.can_manage_roles());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut p = profile(UserRole::User);
        assert_eq!(p.display_name(), "lan.nguyen");

        p.full_name = Some("  ".to_string());
        assert_eq!(p.display_name(), "lan.nguyen");

        p.full_name = Some("Nguyễn Lan".to_string());
        assert_eq!(p.display_name(), "Nguyễn Lan");
    }

    #[test]
    fn test_can_moderate() {
        let user = profile(UserRole::User);
        assert!(user.can_moderate(user.id));
        assert!(!user.can_moderate(Uuid::new_v4()));
        assert!(profile(UserRole::Admin).can_moderate(Uuid::new_v4()));
    }

    #[test]
    fn test_profile_deserializes_with_missing_fields() {
        let id = Uuid::new_v4();
        let json = serde_json::json!({ "id": id, "email": "a@b.vn" });
        let p: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(p.role, UserRole::User);
        assert!(p.full_name.is_none());
    }
}
