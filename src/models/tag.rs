//! Tag model
//!
//! Tags label posts for cross-post discovery on the blog and activity pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: Uuid,
    /// Tag name
    pub name: String,
    /// Optional description shown in the admin table
    #[serde(default)]
    pub description: Option<String>,
    /// Visible on public pages
    #[serde(default)]
    pub published: bool,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for creating a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Input for updating a tag; absent fields stay unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTagInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// Filter for tag listings
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    pub search: Option<String>,
    pub published: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_input_skips_absent_fields() {
        let input = UpdateTagInput {
            published: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({ "published": true }));
    }

    #[test]
    fn test_tag_deserializes_defaults() {
        let id = Uuid::new_v4();
        let tag: Tag = serde_json::from_value(serde_json::json!({ "id": id, "name": "Career" })).unwrap();
        assert_eq!(tag.name, "Career");
        assert!(!tag.published);
        assert!(tag.description.is_none());
    }
}
