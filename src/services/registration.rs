//! Mentor registration service
//!
//! A member files one application at a time; only pending applications can
//! be approved or rejected.

use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceError;
use super::validation::{normalize_optional, require, validate_email};
use crate::backend::repositories::RegistrationRepository;
use crate::backend::AuthToken;
use crate::models::{
    CreateRegistrationInput, ListParams, MentorRegistration, PagedResult, Profile, RegistrationStatus, UserRole,
};

/// Mentor registration service
pub struct RegistrationService {
    repo: Arc<dyn RegistrationRepository>,
}

impl RegistrationService {
    pub fn new(repo: Arc<dyn RegistrationRepository>) -> Self {
        Self { repo }
    }

    pub async fn admin_list(
        &self,
        auth: &AuthToken,
        status: Option<RegistrationStatus>,
        params: &ListParams,
    ) -> Result<PagedResult<MentorRegistration>, ServiceError> {
        Ok(self.repo.list(auth, status, params).await?)
    }

    pub async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<MentorRegistration, ServiceError> {
        self.repo
            .get(auth, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Đơn đăng ký"))
    }

    pub async fn list_mine(&self, auth: &AuthToken, user: &Profile) -> Result<Vec<MentorRegistration>, ServiceError> {
        Ok(self.repo.list_for_user(auth, user.id).await?)
    }

    pub async fn submit(
        &self,
        auth: &AuthToken,
        user: &Profile,
        mut input: CreateRegistrationInput,
    ) -> Result<MentorRegistration, ServiceError> {
        require("full_name", "họ tên", &input.full_name)?;
        validate_email(&input.email)?;
        input.full_name = input.full_name.trim().to_string();
        input.email = input.email.trim().to_lowercase();
        input.phone = normalize_optional(input.phone);
        input.notes = normalize_optional(input.notes);

        if user.role == UserRole::Mentor {
            return Err(ServiceError::Conflict("Bạn đã là mentor".to_string()));
        }
        let existing = self.repo.list_for_user(auth, user.id).await?;
        if existing.iter().any(|r| r.status == RegistrationStatus::Pending) {
            return Err(ServiceError::Conflict(
                "Bạn đã có đơn đăng ký đang chờ duyệt".to_string(),
            ));
        }

        let registration = self.repo.create(auth, user.id, &input).await?;
        tracing::info!("Mentor registration {} submitted by {}", registration.id, user.id);
        Ok(registration)
    }

    pub async fn approve(&self, auth: &AuthToken, id: Uuid, admin_notes: Option<String>) -> Result<MentorRegistration, ServiceError> {
        self.ensure_pending(auth, id).await?;
        let notes = normalize_optional(admin_notes);
        self.repo.approve(auth, id, notes.as_deref()).await?;
        tracing::info!("Mentor registration {} approved", id);
        self.get(auth, id).await
    }

    pub async fn reject(&self, auth: &AuthToken, id: Uuid, admin_notes: Option<String>) -> Result<MentorRegistration, ServiceError> {
        self.ensure_pending(auth, id).await?;
        let notes = normalize_optional(admin_notes);
        let registration = self
            .repo
            .reject(auth, id, notes.as_deref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Đơn đăng ký"))?;
        tracing::info!("Mentor registration {} rejected", id);
        Ok(registration)
    }

    async fn ensure_pending(&self, auth: &AuthToken, id: Uuid) -> Result<(), ServiceError> {
        let registration = self.get(auth, id).await?;
        if registration.status != RegistrationStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "Đơn đăng ký đã được xử lý ({})",
                registration.status.label()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    fn application() -> CreateRegistrationInput {
        CreateRegistrationInput {
            full_name: "Đỗ Quyên".to_string(),
            email: "Quyen@HR.vn".to_string(),
            phone: Some(" ".to_string()),
            notes: Some("10 năm kinh nghiệm C&B".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_once_while_pending() {
        let store = InMemoryStore::new();
        let user = store.add_user("quyen@hr.vn", "secret1", UserRole::User);
        let service = RegistrationService::new(store.repositories().registrations);
        let auth = AuthToken::anonymous();

        let reg = service.submit(&auth, &user, application()).await.unwrap();
        assert_eq!(reg.email, "quyen@hr.vn");
        assert_eq!(reg.phone, None);
        assert_eq!(reg.status, RegistrationStatus::Pending);

        let err = service.submit(&auth, &user, application()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_approve_promotes_and_blocks_second_decision() {
        let store = InMemoryStore::new();
        let user = store.add_user("quyen@hr.vn", "secret1", UserRole::User);
        let service = RegistrationService::new(store.repositories().registrations);
        let auth = AuthToken::anonymous();

        let reg = service.submit(&auth, &user, application()).await.unwrap();
        let approved = service
            .approve(&auth, reg.id, Some("Hồ sơ tốt".to_string()))
            .await
            .unwrap();
        assert_eq!(approved.status, RegistrationStatus::Approved);
        assert_eq!(store.profile(user.id).unwrap().role, UserRole::Mentor);

        let err = service.reject(&auth, reg.id, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_reject_records_notes() {
        let store = InMemoryStore::new();
        let user = store.add_user("quyen@hr.vn", "secret1", UserRole::User);
        let service = RegistrationService::new(store.repositories().registrations);
        let auth = AuthToken::anonymous();

        let reg = service.submit(&auth, &user, application()).await.unwrap();
        let rejected = service
            .reject(&auth, reg.id, Some("Thiếu kinh nghiệm".to_string()))
            .await
            .unwrap();
        assert_eq!(rejected.status, RegistrationStatus::Rejected);
        assert_eq!(rejected.admin_notes.as_deref(), Some("Thiếu kinh nghiệm"));
    }
}
