//! Mentor model
//!
//! A mentor row holds the public profile; work experience, education and
//! activity history live in their own tables and are loaded for the detail
//! page only.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MentorSkill;

/// Mentor profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mentor {
    pub id: Uuid,
    /// Linked account, if the mentor signs in
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub full_name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Skills embedded through the `mentor_skill_links` junction
    #[serde(default)]
    pub skills: Vec<MentorSkill>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One job in a mentor's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// `None` means current position
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// One degree or course in a mentor's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub school: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Community activity, talk, or volunteering entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorActivity {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Aggregates computed by the `get_mentor_stats` procedure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MentorStats {
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_reviews: i64,
    #[serde(default)]
    pub total_bookings: i64,
    #[serde(default)]
    pub completed_bookings: i64,
}

/// Everything the mentor detail page shows
#[derive(Debug, Clone, Serialize)]
pub struct MentorDetail {
    #[serde(flatten)]
    pub mentor: Mentor,
    pub work_experiences: Vec<WorkExperience>,
    pub educations: Vec<Education>,
    pub activities: Vec<MentorActivity>,
    pub stats: MentorStats,
}

/// Input for creating a mentor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMentorInput {
    pub full_name: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing)]
    pub skill_ids: Vec<Uuid>,
}

/// Input for updating a mentor; absent fields stay unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMentorInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Replaces the skill associations when present
    #[serde(default, skip_serializing)]
    pub skill_ids: Option<Vec<Uuid>>,
}

/// Filter for mentor listings
#[derive(Debug, Clone, Default)]
pub struct MentorFilter {
    pub published: Option<bool>,
    pub search: Option<String>,
    pub skill_id: Option<Uuid>,
}
