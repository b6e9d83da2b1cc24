//! User-visible outcome notifications.
//!
//! Every state-changing operation maps its outcome to a transient,
//! auto-dismissing message: success always notifies, failure notifies
//! with the server's message when present and a per-operation default
//! otherwise. Read-only fetch failures may be logged without a
//! notification (the cart-absence policy in
//! [`crate::stores::cart::CartStore::refresh_cart`]).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Maximum number of notifications retained at once.
const MAX_RETAINED: usize = 32;

/// Kind of a notification, controlling its presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(kind: NotificationKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Sink for operation outcomes.
///
/// A trait so tests can substitute a recording implementation and
/// embedders can bridge to their own toast/banner machinery.
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    fn notify(&self, notification: Notification);

    /// Convenience: deliver a success message.
    fn success(&self, text: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(Notification::new(NotificationKind::Success, text));
    }

    /// Convenience: deliver an error message.
    fn error(&self, text: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(Notification::new(NotificationKind::Error, text));
    }
}

/// Dynamic-dispatch helpers so `Arc<dyn Notifier>` call sites read
/// the same as concrete ones.
impl dyn Notifier {
    pub fn push_success(&self, text: impl Into<String>) {
        self.notify(Notification::new(NotificationKind::Success, text));
    }

    pub fn push_error(&self, text: impl Into<String>) {
        self.notify(Notification::new(NotificationKind::Error, text));
    }
}

/// Default notifier: a bounded in-memory queue with an auto-dismiss
/// TTL, echoing each message through `tracing`.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<NotificationCenterInner>,
}

struct NotificationCenterInner {
    queue: Mutex<VecDeque<Notification>>,
    ttl: Duration,
}

impl NotificationCenter {
    /// Create a center whose notifications stay active for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(NotificationCenterInner {
                queue: Mutex::new(VecDeque::new()),
                ttl,
            }),
        }
    }

    /// Notifications still within their display lifetime, oldest
    /// first. Expired entries are pruned as a side effect.
    #[must_use]
    pub fn active(&self) -> Vec<Notification> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.inner.ttl).unwrap_or(chrono::Duration::zero());
        let mut queue = self.lock();
        while queue.front().is_some_and(|n| n.created_at < cutoff) {
            queue.pop_front();
        }
        queue.iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                tracing::info!(message = %notification.text, "notification");
            }
            NotificationKind::Error => {
                tracing::warn!(message = %notification.text, "notification");
            }
        }

        let mut queue = self.lock();
        if queue.len() >= MAX_RETAINED {
            queue.pop_front();
        }
        queue.push_back(notification);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_active_returns_recent() {
        let center = NotificationCenter::new(Duration::from_secs(60));
        center.success("Item added to cart!");
        center.error("Failed to update cart");

        let active = center.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active.first().unwrap().kind, NotificationKind::Success);
        assert_eq!(active.get(1).unwrap().text, "Failed to update cart");
    }

    #[test]
    fn test_expired_are_pruned() {
        let center = NotificationCenter::new(Duration::ZERO);
        center.success("gone in an instant");
        assert!(center.active().is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let center = NotificationCenter::new(Duration::from_secs(60));
        for i in 0..(MAX_RETAINED + 10) {
            center.success(format!("message {i}"));
        }
        assert_eq!(center.active().len(), MAX_RETAINED);
    }

    #[test]
    fn test_dyn_helpers() {
        let center = NotificationCenter::new(Duration::from_secs(60));
        let notifier: Arc<dyn Notifier> = Arc::new(center.clone());
        notifier.push_success("ok");
        notifier.push_error("bad");
        assert_eq!(center.active().len(), 2);
    }
}
