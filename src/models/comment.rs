//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthorInfo;

/// Text shown in place of a soft-deleted comment
pub const DELETED_COMMENT_TEXT: &str = "Bình luận này đã bị xóa.";

/// Comment entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    /// Parent comment for nested replies
    #[serde(default)]
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    /// Soft-delete flag
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub author: Option<AuthorInfo>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Comment with its replies, ready for display
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
    pub avatar_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Wrap a comment, masking deleted content
    pub fn new(mut comment: Comment) -> Self {
        if comment.is_deleted {
            comment.content = DELETED_COMMENT_TEXT.to_string();
        }
        let author_name = comment
            .author
            .as_ref()
            .and_then(|a| a.full_name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Người dùng".to_string());
        let avatar_url = comment
            .author
            .as_ref()
            .and_then(|a| a.avatar_url.clone())
            .unwrap_or_else(|| Self::identicon_url(comment.author_id));
        Self {
            comment,
            author_name,
            avatar_url,
            replies: Vec::new(),
        }
    }

    /// Generated avatar for authors without an uploaded picture
    pub fn identicon_url(author_id: Uuid) -> String {
        let hash = format!("{:x}", md5::compute(author_id.to_string()));
        format!("https://www.gravatar.com/avatar/{}?d=identicon&s=80", hash)
    }

    /// Number of comments in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::count).sum::<usize>()
    }
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentInput {
    pub post_id: Uuid,
    #[serde(default)]
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
}
