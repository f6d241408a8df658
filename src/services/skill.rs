//! Mentor skill service

use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceError;
use super::validation::{normalize_optional, require};
use crate::backend::repositories::SkillRepository;
use crate::backend::AuthToken;
use crate::models::{ListParams, MentorSkill, PagedResult, SkillInput};

pub struct SkillService {
    repo: Arc<dyn SkillRepository>,
}

impl SkillService {
    pub fn new(repo: Arc<dyn SkillRepository>) -> Self {
        Self { repo }
    }

    /// Admin listing; the procedure returns every skill, so paging and
    /// search happen here
    pub async fn admin_list(
        &self,
        auth: &AuthToken,
        search: Option<&str>,
        params: &ListParams,
    ) -> Result<PagedResult<MentorSkill>, ServiceError> {
        let mut skills = self.repo.admin_list(auth).await?;
        if let Some(term) = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
            skills.retain(|s| s.name.to_lowercase().contains(&term));
        }
        Ok(crate::models::paginate_slice(&skills, params))
    }

    pub async fn list_published(&self, auth: &AuthToken) -> Result<Vec<MentorSkill>, ServiceError> {
        Ok(self.repo.list_published(auth).await?)
    }

    pub async fn create(&self, auth: &AuthToken, input: SkillInput) -> Result<MentorSkill, ServiceError> {
        let input = normalize(input)?;
        let skill = self.repo.create(auth, &input).await.map_err(conflict_on_duplicate)?;
        tracing::info!("Skill {} created", skill.id);
        Ok(skill)
    }

    pub async fn update(&self, auth: &AuthToken, id: Uuid, input: SkillInput) -> Result<MentorSkill, ServiceError> {
        let input = normalize(input)?;
        let skill = self.repo.update(auth, id, &input).await.map_err(conflict_on_duplicate)?;
        tracing::info!("Skill {} updated", id);
        Ok(skill)
    }

    pub async fn delete(&self, auth: &AuthToken, id: Uuid) -> Result<(), ServiceError> {
        self.repo.delete(auth, id).await?;
        tracing::info!("Skill {} deleted", id);
        Ok(())
    }
}

fn normalize(mut input: SkillInput) -> Result<SkillInput, ServiceError> {
    require("name", "tên kỹ năng", &input.name)?;
    input.name = input.name.trim().to_string();
    input.description = normalize_optional(input.description);
    Ok(input)
}

fn conflict_on_duplicate(err: crate::backend::BackendError) -> ServiceError {
    if err.is_conflict() {
        ServiceError::Conflict("Kỹ năng đã tồn tại".to_string())
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    fn skill(name: &str) -> SkillInput {
        SkillInput {
            name: name.to_string(),
            description: None,
            published: true,
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let store = InMemoryStore::new();
        let service = SkillService::new(store.repositories().skills);
        let auth = AuthToken::anonymous();
        service.create(&auth, skill("Coaching")).await.unwrap();
        let err = service.create(&auth, skill(" Coaching ")).await.unwrap_err();
        assert_eq!(err.user_message(), "Kỹ năng đã tồn tại");
    }

    #[tokio::test]
    async fn test_admin_list_search_and_pages() {
        let store = InMemoryStore::new();
        let service = SkillService::new(store.repositories().skills);
        let auth = AuthToken::anonymous();
        for name in ["Phỏng vấn", "Viết CV", "Phỏng vấn nhóm"] {
            service.create(&auth, skill(name)).await.unwrap();
        }

        let page = service
            .admin_list(&auth, Some("phỏng"), &ListParams::new(1, 1))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let store = InMemoryStore::new();
        let service = SkillService::new(store.repositories().skills);
        assert!(matches!(
            service.create(&AuthToken::anonymous(), skill(" ")).await,
            Err(ServiceError::ValidationError(_))
        ));
    }
}
