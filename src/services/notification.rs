//! Notification centre
//!
//! Per-client queues of short-lived messages. HTML form handlers push a
//! notification before redirecting; the next page render drains it.
//! Each queue keeps at most `max_visible` entries (oldest evicted first)
//! and every entry expires after `duration`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Notification centre
pub struct NotificationCenter {
    queues: Arc<RwLock<HashMap<String, VecDeque<Notification>>>>,
    max_visible: usize,
    duration: Duration,
}

impl NotificationCenter {
    pub fn new(max_visible: usize, duration_ms: u64) -> Self {
        Self {
            queues: Arc::new(RwLock::new(HashMap::new())),
            max_visible: max_visible.max(1),
            duration: Duration::milliseconds(duration_ms as i64),
        }
    }

    pub async fn push(&self, client: &str, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            expires_at: now + self.duration,
        };
        let id = notification.id;

        let mut queues = self.queues.write().await;
        let queue = queues.entry(client.to_string()).or_default();
        queue.retain(|n| n.expires_at > now);
        queue.push_back(notification);
        while queue.len() > self.max_visible {
            queue.pop_front();
        }
        id
    }

    pub async fn success(&self, client: &str, message: impl Into<String>) -> Uuid {
        self.push(client, NotificationKind::Success, message).await
    }

    pub async fn error(&self, client: &str, message: impl Into<String>) -> Uuid {
        self.push(client, NotificationKind::Error, message).await
    }

    pub async fn info(&self, client: &str, message: impl Into<String>) -> Uuid {
        self.push(client, NotificationKind::Info, message).await
    }

    pub async fn warning(&self, client: &str, message: impl Into<String>) -> Uuid {
        self.push(client, NotificationKind::Warning, message).await
    }

    /// Live notifications without consuming them
    pub async fn visible(&self, client: &str) -> Vec<Notification> {
        let now = Utc::now();
        let queues = self.queues.read().await;
        queues
            .get(client)
            .map(|q| q.iter().filter(|n| n.expires_at > now).cloned().collect())
            .unwrap_or_default()
    }

    /// Live notifications, removing them from the queue
    pub async fn take(&self, client: &str) -> Vec<Notification> {
        let now = Utc::now();
        let mut queues = self.queues.write().await;
        queues
            .remove(client)
            .map(|q| q.into_iter().filter(|n| n.expires_at > now).collect())
            .unwrap_or_default()
    }

    pub async fn dismiss(&self, client: &str, id: Uuid) {
        let mut queues = self.queues.write().await;
        if let Some(queue) = queues.get_mut(client) {
            queue.retain(|n| n.id != id);
            if queue.is_empty() {
                queues.remove(client);
            }
        }
    }

    /// Drop expired entries and empty queues (should be called periodically)
    pub async fn cleanup(&self) {
        let now = Utc::now();
        let mut queues = self.queues.write().await;
        queues.retain(|_, queue| {
            queue.retain(|n| n.expires_at > now);
            !queue.is_empty()
        });
    }

    pub async fn client_count(&self) -> usize {
        self.queues.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_max_visible_evicts_oldest() {
        let center = NotificationCenter::new(3, 5_000);
        for i in 0..5 {
            center.info("c1", format!("msg {}", i)).await;
        }
        let visible = center.visible("c1").await;
        let messages: Vec<_> = visible.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["msg 2", "msg 3", "msg 4"]);
    }

    #[tokio::test]
    async fn test_clients_are_isolated() {
        let center = NotificationCenter::new(3, 5_000);
        center.success("a", "saved").await;
        assert!(center.visible("b").await.is_empty());
        assert_eq!(center.visible("a").await[0].kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn test_take_drains() {
        let center = NotificationCenter::new(3, 5_000);
        center.error("a", "failed").await;
        assert_eq!(center.take("a").await.len(), 1);
        assert!(center.take("a").await.is_empty());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let center = NotificationCenter::new(3, 30);
        center.warning("a", "soon gone").await;
        assert_eq!(center.visible("a").await.len(), 1);

        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        assert!(center.visible("a").await.is_empty());

        center.cleanup().await;
        assert_eq!(center.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_dismiss() {
        let center = NotificationCenter::new(3, 5_000);
        let first = center.info("a", "one").await;
        center.info("a", "two").await;
        center.dismiss("a", first).await;
        let visible = center.visible("a").await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "two");
    }

    #[tokio::test]
    async fn test_zero_cap_is_raised_to_one() {
        let center = NotificationCenter::new(0, 5_000);
        center.info("a", "one").await;
        center.info("a", "two").await;
        assert_eq!(center.visible("a").await.len(), 1);
    }
}
