//! Search debouncer
//!
//! Live-search requests from one client arrive on every keystroke. Each
//! request takes a ticket for its key, waits out the quiet delay, and only
//! proceeds if no newer ticket was issued for the same key meanwhile.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Grace period past the delay before a ticket counts as abandoned
const ABANDONED_AFTER: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Ticket {
    generation: u64,
    issued_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debounced {
    /// Latest request of its burst; run the query
    Proceed,
    /// A newer request for the same key arrived during the delay
    Superseded,
}

/// Search debouncer
pub struct Debouncer {
    tickets: Arc<RwLock<HashMap<String, Ticket>>>,
    delay: Duration,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            tickets: Arc::new(RwLock::new(HashMap::new())),
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Wait the quiet delay and report whether this request is still the latest
    pub async fn settle(&self, key: &str) -> Debounced {
        let mine = {
            let mut tickets = self.tickets.write().await;
            let generation = tickets.get(key).map_or(1, |t| t.generation + 1);
            tickets.insert(
                key.to_string(),
                Ticket {
                    generation,
                    issued_at: Instant::now(),
                },
            );
            generation
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut tickets = self.tickets.write().await;
        match tickets.get(key) {
            Some(current) if current.generation == mine => {
                tickets.remove(key);
                Debounced::Proceed
            }
            _ => Debounced::Superseded,
        }
    }

    /// Keys with a request still waiting
    pub async fn pending(&self) -> usize {
        self.tickets.read().await.len()
    }

    /// Drop tickets whose request was cancelled before it could settle
    /// (client disconnected during the delay)
    pub async fn cleanup(&self) {
        self.cleanup_older_than(ABANDONED_AFTER).await;
    }

    async fn cleanup_older_than(&self, grace: Duration) {
        let cutoff = self.delay + grace;
        let mut tickets = self.tickets.write().await;
        let before = tickets.len();
        tickets.retain(|_, ticket| ticket.issued_at.elapsed() <= cutoff);
        let removed = before - tickets.len();
        if removed > 0 {
            tracing::debug!("Pruned {} abandoned search tickets", removed);
        }
    }
}
