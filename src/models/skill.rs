//! Mentor skill model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A skill a mentor can list on their profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MentorSkill {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published: bool,
    /// Number of mentors listing the skill, filled by the admin procedure
    #[serde(default)]
    pub mentor_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for creating or replacing a skill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published: bool,
}
