//! Dashboard statistics

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::single_row;
use crate::backend::{AuthToken, BackendClient, BackendError};
use crate::models::DashboardStats;

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn dashboard(&self, auth: &AuthToken) -> Result<DashboardStats, BackendError>;
}

pub struct RestStatsRepository {
    client: BackendClient,
}

impl RestStatsRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn StatsRepository> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl StatsRepository for RestStatsRepository {
    async fn dashboard(&self, auth: &AuthToken) -> Result<DashboardStats, BackendError> {
        let value: Value = self
            .client
            .rpc(auth, "admin_get_statistics", &json!({}))
            .await?;
        single_row(value)
    }
}
