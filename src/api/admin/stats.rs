//! Admin dashboard statistics

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::DashboardStats;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: DashboardStats,
    /// Completed share of all bookings, 0..=100
    pub completion_rate: f64,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

async fn dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.stats_service.dashboard(user.auth()).await?;
    let completion_rate = stats.completion_rate();
    Ok(Json(StatsResponse { stats, completion_rate }))
}
