//! Mentor service

use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceError;
use super::validation::{normalize_optional, require, validate_email};
use crate::backend::repositories::MentorRepository;
use crate::backend::AuthToken;
use crate::models::{
    CreateMentorInput, ListParams, Mentor, MentorDetail, MentorFilter, MentorStats, PagedResult,
    UpdateMentorInput,
};

/// Mentor service
pub struct MentorService {
    repo: Arc<dyn MentorRepository>,
}

impl MentorService {
    pub fn new(repo: Arc<dyn MentorRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_published(
        &self,
        auth: &AuthToken,
        mut filter: MentorFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Mentor>, ServiceError> {
        filter.published = Some(true);
        Ok(self.repo.list(auth, &filter, params).await?)
    }

    pub async fn list(
        &self,
        auth: &AuthToken,
        filter: &MentorFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Mentor>, ServiceError> {
        Ok(self.repo.list(auth, filter, params).await?)
    }

    pub async fn get(&self, auth: &AuthToken, id: Uuid) -> Result<Mentor, ServiceError> {
        self.repo
            .get(auth, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Mentor"))
    }

    /// Profile page data. With `published_only`, hidden mentors read as missing.
    pub async fn get_detail(&self, auth: &AuthToken, id: Uuid, published_only: bool) -> Result<MentorDetail, ServiceError> {
        let mentor = self.get(auth, id).await?;
        if published_only && !mentor.published {
            return Err(ServiceError::not_found("Mentor"));
        }

        let (work_experiences, educations, activities) = futures::try_join!(
            self.repo.work_experiences(auth, id),
            self.repo.educations(auth, id),
            self.repo.activities(auth, id),
        )?;

        // Stats are decorative; a failing procedure should not hide the profile
        let stats = match self.repo.stats(auth, id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Failed to load stats for mentor {}: {}", id, e);
                MentorStats::default()
            }
        };

        Ok(MentorDetail {
            mentor,
            work_experiences,
            educations,
            activities,
            stats,
        })
    }

    pub async fn create(&self, auth: &AuthToken, mut input: CreateMentorInput) -> Result<Mentor, ServiceError> {
        require("full_name", "họ tên mentor", &input.full_name)?;
        input.full_name = input.full_name.trim().to_string();
        input.email = normalize_optional(input.email);
        if let Some(email) = input.email.as_deref() {
            validate_email(email)?;
        }
        input.headline = normalize_optional(input.headline);
        input.bio = normalize_optional(input.bio);

        let created = self.repo.create(auth, &input).await?;
        if !input.skill_ids.is_empty() {
            self.repo.set_skills(auth, created.id, &input.skill_ids).await?;
        }
        tracing::info!("Mentor {} created", created.id);
        self.get(auth, created.id).await
    }

    pub async fn update(&self, auth: &AuthToken, id: Uuid, mut input: UpdateMentorInput) -> Result<Mentor, ServiceError> {
        if let Some(name) = input.full_name.as_deref() {
            require("full_name", "họ tên mentor", name)?;
            input.full_name = Some(name.trim().to_string());
        }
        if let Some(email) = input.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            validate_email(email)?;
        }

        self.repo
            .update(auth, id, &input)
            .await?
            .ok_or_else(|| ServiceError::not_found("Mentor"))?;
        if let Some(skill_ids) = input.skill_ids.as_deref() {
            self.repo.set_skills(auth, id, skill_ids).await?;
        }
        tracing::info!("Mentor {} updated", id);
        self.get(auth, id).await
    }

    pub async fn set_published(&self, auth: &AuthToken, id: Uuid, published: bool) -> Result<Mentor, ServiceError> {
        self.repo
            .set_published(auth, id, published)
            .await?
            .ok_or_else(|| ServiceError::not_found("Mentor"))?;
        tracing::info!("Mentor {} published={}", id, published);
        self.get(auth, id).await
    }

    pub async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), ServiceError> {
        self.get(auth, id).await?;
        self.repo.delete(auth, id).await?;
        tracing::info!("Mentor {} deleted", id);
        Ok(())
    }
}
