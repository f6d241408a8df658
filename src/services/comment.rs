//! Comment service
//!
//! Comments are stored flat with a nullable parent reference and grouped
//! into reply trees for display.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceError;
use super::validation::require;
use crate::backend::repositories::CommentRepository;
use crate::backend::AuthToken;
use crate::models::{Comment, CommentNode, CreateCommentInput, Profile};

pub const MAX_COMMENT_LEN: usize = 2000;

/// Deepest reply level shown nested under a root (roots are level 0)
pub const MAX_REPLY_DEPTH: usize = 4;

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    /// Reply forest of a post
    pub async fn list_tree(&self, auth: &AuthToken, post_id: Uuid) -> Result<Vec<CommentNode>, ServiceError> {
        let comments = self.repo.list_for_post(auth, post_id).await?;
        Ok(build_comment_tree(comments))
    }

    pub async fn create(
        &self,
        auth: &AuthToken,
        author: &Profile,
        mut input: CreateCommentInput,
    ) -> Result<Comment, ServiceError> {
        require("content", "nội dung bình luận", &input.content)?;
        input.content = input.content.trim().to_string();
        if input.content.chars().count() > MAX_COMMENT_LEN {
            return Err(ServiceError::ValidationError(format!(
                "Bình luận không được vượt quá {} ký tự",
                MAX_COMMENT_LEN
            )));
        }

        if let Some(parent_id) = input.parent_comment_id {
            let parent = self
                .repo
                .get(auth, parent_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Bình luận gốc"))?;
            if parent.post_id != input.post_id {
                return Err(ServiceError::ValidationError(
                    "Bình luận gốc không thuộc bài viết này".to_string(),
                ));
            }
            if self.depth_of(auth, &parent).await? >= MAX_REPLY_DEPTH {
                return Err(ServiceError::ValidationError(
                    "Không thể trả lời sâu hơn trong chuỗi bình luận này".to_string(),
                ));
            }
        }

        let comment = self.repo.create(auth, author.id, &input).await?;
        tracing::info!("Comment {} created on post {}", comment.id, comment.post_id);
        Ok(comment)
    }

    /// Number of ancestors above `comment`, counted up to `MAX_REPLY_DEPTH`
    async fn depth_of(&self, auth: &AuthToken, comment: &Comment) -> Result<usize, ServiceError> {
        let mut depth = 0;
        let mut parent = comment.parent_comment_id;
        while let Some(id) = parent {
            if depth >= MAX_REPLY_DEPTH {
                break;
            }
            match self.repo.get(auth, id).await? {
                Some(ancestor) => {
                    depth += 1;
                    parent = ancestor.parent_comment_id;
                }
                None => break,
            }
        }
        Ok(depth)
    }

    /// Soft delete; only the author or an admin may do it
    pub async fn delete(&self, auth: &AuthToken, actor: &Profile, id: Uuid) -> Result<(), ServiceError> {
        let comment = self
            .repo
            .get(auth, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bình luận"))?;

        if !actor.can_moderate(comment.author_id) {
            tracing::warn!("User {} tried to delete comment {} of {}", actor.id, id, comment.author_id);
            return Err(ServiceError::forbidden());
        }

        self.repo.soft_delete(auth, id).await?;
        tracing::info!("Comment {} deleted by {}", id, actor.id);
        Ok(())
    }
}

/// Group a flat comment list into reply trees.
///
/// Children keep input order. A comment whose parent is absent (or is
/// itself) becomes a root. Replies below `MAX_REPLY_DEPTH` start a new root
/// after the others, which keeps every tree shallow however long a reply
/// chain grows. Comments only reachable through a parent cycle are promoted
/// to roots too, so every input comment appears exactly once.
pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    let ids: HashSet<Uuid> = comments.iter().map(|c| c.id).collect();
    let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();
    let mut pending = VecDeque::new();

    for (idx, comment) in comments.iter().enumerate() {
        match comment.parent_comment_id {
            Some(parent) if parent != comment.id && ids.contains(&parent) => {
                children.entry(parent).or_default().push(idx);
            }
            _ => pending.push_back(idx),
        }
    }

    let mut slots: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut roots = Vec::new();
    let mut next_unvisited = 0;

    loop {
        while let Some(idx) = pending.pop_front() {
            if let Some(node) = attach(idx, 0, &mut slots, &children, &mut pending) {
                roots.push(node);
            }
        }
        // Whatever is left sits on a cycle
        match (next_unvisited..slots.len()).find(|&idx| slots[idx].is_some()) {
            Some(idx) => {
                pending.push_back(idx);
                next_unvisited = idx + 1;
            }
            None => break,
        }
    }

    roots
}

/// Builds the subtree under `idx`. Recursion stops at `MAX_REPLY_DEPTH`;
/// deeper replies are queued in `overflow` as future roots.
fn attach(
    idx: usize,
    depth: usize,
    slots: &mut [Option<Comment>],
    children: &HashMap<Uuid, Vec<usize>>,
    overflow: &mut VecDeque<usize>,
) -> Option<CommentNode> {
    let comment = slots[idx].take()?;
    let mut node = CommentNode::new(comment);
    if let Some(kids) = children.get(&node.comment.id) {
        for &kid in kids {
            if depth >= MAX_REPLY_DEPTH {
                overflow.push_back(kid);
            } else if let Some(child) = attach(kid, depth + 1, slots, children, overflow) {
                node.replies.push(child);
            }
        }
    }
    Some(node)
}
