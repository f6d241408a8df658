//! Post model
//!
//! This module provides:
//! - `Post` entity for blog articles and activity news
//! - `BlockDocument` structured content produced by the block editor
//! - Input and filter types for the admin panel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Tag;

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: Uuid,
    /// Post title
    pub title: String,
    /// Short summary shown on cards
    #[serde(default)]
    pub description: Option<String>,
    /// Thumbnail image URL
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Structured block content
    #[serde(default)]
    pub content: BlockDocument,
    /// Author user ID
    #[serde(default)]
    pub author_id: Option<Uuid>,
    /// Embedded author profile
    #[serde(default)]
    pub author: Option<AuthorInfo>,
    /// Blog article or activity news
    #[serde(rename = "type", default)]
    pub post_type: PostType,
    /// Visible on public pages
    #[serde(default)]
    pub published: bool,
    /// Publication timestamp
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Tags embedded through the `post_tags` junction
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Author fields embedded in post and comment rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Post kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    /// Blog article
    #[default]
    Blog,
    /// Activity news
    Activity,
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostType::Blog => write!(f, "blog"),
            PostType::Activity => write!(f, "activity"),
        }
    }
}

impl FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blog" => Ok(PostType::Blog),
            "activity" => Ok(PostType::Activity),
            _ => Err(format!("Invalid post type: {}", s)),
        }
    }
}

/// Document produced by the block editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// One editor block; `data` depends on `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl BlockDocument {
    /// Plain text of the document, used for search snippets
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| b.data.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Paragraph blocks from text separated by blank lines
    pub fn from_paragraphs(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n");
        let blocks = normalized
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Block {
                id: None,
                kind: "paragraph".to_string(),
                data: serde_json::json!({ "text": p.replace('\n', "<br>") }),
            })
            .collect();
        Self {
            time: Some(chrono::Utc::now().timestamp_millis()),
            version: None,
            blocks,
        }
    }

    /// Text of a paragraphs-only document; `None` when other block types are present
    pub fn as_paragraphs(&self) -> Option<String> {
        self.blocks
            .iter()
            .map(|b| {
                (b.kind == "paragraph").then(|| {
                    b.data
                        .get("text")
                        .and_then(|t| t.as_str())
                        .unwrap_or_default()
                        .replace("<br>", "\n")
                })
            })
            .collect::<Option<Vec<_>>>()
            .map(|paragraphs| paragraphs.join("\n\n"))
    }
}

/// Input for creating a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub content: BlockDocument,
    #[serde(rename = "type", default)]
    pub post_type: PostType,
    #[serde(default)]
    pub published: bool,
    /// Tag associations, written to the junction table
    #[serde(default, skip_serializing)]
    pub tag_ids: Vec<Uuid>,
}

/// Input for updating a post; absent fields stay unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BlockDocument>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub post_type: Option<PostType>,
    /// Replaces the tag associations when present
    #[serde(default, skip_serializing)]
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Filter for post listings
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub post_type: Option<PostType>,
    pub published: Option<bool>,
    pub search: Option<String>,
    pub tag_id: Option<Uuid>,
}
