//! Admin dashboard statistics

use std::sync::Arc;

use super::error::ServiceError;
use crate::backend::repositories::StatsRepository;
use crate::backend::AuthToken;
use crate::models::DashboardStats;

pub struct StatsService {
    repo: Arc<dyn StatsRepository>,
}

impl StatsService {
    pub fn new(repo: Arc<dyn StatsRepository>) -> Self {
        Self { repo }
    }

    pub async fn dashboard(&self, auth: &AuthToken) -> Result<DashboardStats, ServiceError> {
        self.repo.dashboard(auth).await.map_err(|e| {
            tracing::error!("Failed to load dashboard statistics: {}", e);
            e.into()
        })
    }
}
