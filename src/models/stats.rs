//! Dashboard statistics returned by `admin_get_statistics`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: i64,
    #[serde(default)]
    pub total_mentors: i64,
    #[serde(default)]
    pub published_mentors: i64,
    #[serde(default)]
    pub total_bookings: i64,
    #[serde(default)]
    pub pending_bookings: i64,
    #[serde(default)]
    pub completed_bookings: i64,
    #[serde(default)]
    pub pending_registrations: i64,
    #[serde(default)]
    pub total_posts: i64,
    #[serde(default)]
    pub published_posts: i64,
    /// Bookings per month, oldest first
    #[serde(default)]
    pub bookings_by_month: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    pub count: i64,
}

impl DashboardStats {
    /// Share of bookings that reached `completed`, in percent
    pub fn completion_rate(&self) -> f64 {
        if self.total_bookings == 0 {
            return 0.0;
        }
        (self.completed_bookings as f64 / self.total_bookings as f64) * 100.0
    }
}
