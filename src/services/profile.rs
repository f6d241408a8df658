//! Profile service
//!
//! Account self-service and the admin user list. Role changes are reserved
//! to superadmins.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceError;
use super::validation::{normalize_optional, require};
use crate::backend::repositories::ProfileRepository;
use crate::backend::AuthToken;
use crate::models::{ListParams, PagedResult, Profile, ProfileFilter, UpdateProfileInput, UserRole};

pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Profile, ServiceError> {
        self.repo
            .get(auth, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Người dùng"))
    }

    pub async fn update_mine(
        &self,
        auth: &AuthToken,
        user: &Profile,
        mut input: UpdateProfileInput,
    ) -> Result<Profile, ServiceError> {
        if let Some(name) = input.full_name.as_deref() {
            require("full_name", "họ tên", name)?;
            input.full_name = Some(name.trim().to_string());
        }
        if let Some(phone) = normalize_optional(input.phone.take()) {
            if !is_valid_phone(&phone) {
                return Err(ServiceError::ValidationError("Số điện thoại không hợp lệ".to_string()));
            }
            input.phone = Some(phone);
        }
        if let Some(dob) = input.date_of_birth {
            if dob > Utc::now().date_naive() {
                return Err(ServiceError::ValidationError(
                    "Ngày sinh không được ở tương lai".to_string(),
                ));
            }
        }
        input.address = normalize_optional(input.address);
        input.bio = normalize_optional(input.bio);
        input.gender = normalize_optional(input.gender);

        let profile = self
            .repo
            .update(auth, user.id, &input)
            .await?
            .ok_or_else(|| ServiceError::not_found("Người dùng"))?;
        tracing::info!("Profile {} updated", user.id);
        Ok(profile)
    }

    pub async fn set_avatar(&self, auth: &AuthToken, user: &Profile, url: String) -> Result<Profile, ServiceError> {
        let input = UpdateProfileInput {
            avatar_url: Some(url),
            ..Default::default()
        };
        self.repo
            .update(auth, user.id, &input)
            .await?
            .ok_or_else(|| ServiceError::not_found("Người dùng"))
    }

    pub async fn admin_list(
        &self,
        auth: &AuthToken,
        filter: &ProfileFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Profile>, ServiceError> {
        Ok(self.repo.list(auth, filter, params).await?)
    }

    pub async fn set_role(
        &self,
        auth: &AuthToken,
        actor: &Profile,
        id: Uuid,
        role: UserRole,
    ) -> Result<Profile, ServiceError> {
        if !actor.role.can_manage_roles() {
            tracing::warn!("User {} tried to change role of {}", actor.id, id);
            return Err(ServiceError::forbidden());
        }
        if actor.id == id {
            return Err(ServiceError::ValidationError(
                "Bạn không thể thay đổi vai trò của chính mình".to_string(),
            ));
        }
        let profile = self
            .repo
            .set_role(auth, id, role)
            .await?
            .ok_or_else(|| ServiceError::not_found("Người dùng"))?;
        tracing::info!("User {} role set to {} by {}", id, role, actor.id);
        Ok(profile)
    }
}

/// Digits with an optional leading `+`, 9 to 15 digits
fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let digits: String = digits.chars().filter(|c| *c != ' ' && *c != '.' && *c != '-').collect();
    (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    #[test]
    fn test_phone_format() {
        assert!(is_valid_phone("0912 345 678"));
        assert!(is_valid_phone("+84912345678"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("09x2345678"));
    }

    #[tokio::test]
    async fn test_update_mine() {
        let store = InMemoryStore::new();
        let user = store.add_user("minh@hr.vn", "secret1", UserRole::User);
        let service = ProfileService::new(store.repositories().profiles);
        let input = UpdateProfileInput {
            full_name: Some("  Nguyễn Minh ".to_string()),
            phone: Some("0912345678".to_string()),
            bio: Some("   ".to_string()),
            ..Default::default()
        };
        let updated = service.update_mine(&AuthToken::anonymous(), &user, input).await.unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Nguyễn Minh"));
        assert_eq!(updated.phone.as_deref(), Some("0912345678"));
    }

    #[tokio::test]
    async fn test_future_birthday_rejected() {
        let store = InMemoryStore::new();
        let user = store.add_user("minh@hr.vn", "secret1", UserRole::User);
        let service = ProfileService::new(store.repositories().profiles);
        let input = UpdateProfileInput {
            date_of_birth: Some(Utc::now().date_naive() + chrono::Duration::days(3)),
            ..Default::default()
        };
        assert!(service.update_mine(&AuthToken::anonymous(), &user, input).await.is_err());
    }

    #[tokio::test]
    async fn test_only_superadmin_changes_roles() {
        let store = InMemoryStore::new();
        let admin = store.add_user("admin@hr.vn", "secret1", UserRole::Admin);
        let root = store.add_user("root@hr.vn", "secret1", UserRole::Superadmin);
        let user = store.add_user("u@hr.vn", "secret1", UserRole::User);
        let service = ProfileService::new(store.repositories().profiles);
        let auth = AuthToken::anonymous();

        assert!(matches!(
            service.set_role(&auth, &admin, user.id, UserRole::Admin).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.set_role(&auth, &root, root.id, UserRole::User).await,
            Err(ServiceError::ValidationError(_))
        ));
        let promoted = service.set_role(&auth, &root, user.id, UserRole::Admin).await.unwrap();
        assert_eq!(promoted.role, UserRole::Admin);
    }
}
