//! # Notification Hub
//!
//! Injectable pub/sub for UI notifications (toasts).
//!
//! The hub is an ordinary value, not a process-wide global: construct
//! one, hand clones to the managers, and subscribe from however many
//! views care. Nothing to reset between tests.
//!
//! ```rust
//! use velva_pos::NotificationHub;
//!
//! let hub = NotificationHub::new();
//! let mut toasts = hub.subscribe();
//!
//! hub.success("Order placed");
//! let notice = toasts.try_recv().unwrap();
//! assert_eq!(notice.message, "Order placed");
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// How a notice should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One toast-worthy event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Cloneable pub/sub handle. All clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notice>,
}

/// Bounded backlog per subscriber; a stalled view drops oldest notices
/// rather than blocking the register.
const CHANNEL_CAPACITY: usize = 64;

impl NotificationHub {
    /// Creates a hub with the default capacity.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        NotificationHub { tx }
    }

    /// Opens a new subscription. Each subscriber sees every notice
    /// published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publishes a success notice.
    pub fn success(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Success, message.into());
    }

    /// Publishes an error notice.
    pub fn error(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Error, message.into());
    }

    fn publish(&self, level: NoticeLevel, message: String) {
        // A send with zero subscribers is not an error; headless callers
        // (tests, the seed binary) simply run without toasts.
        let _ = self.tx.send(Notice { level, message });
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
