//! User-facing notifications.
//!
//! The interceptor pipeline reports every failed call through a `Notifier`
//! exactly once. How the message is shown (a toast, a status line, a log
//! record) is up to the embedding application.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

/// Sink for short, transient user-visible messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Writes notifications to the log. Useful for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        warn!(notice = message, "User notification");
    }
}

/// Keeps every notification in memory, in order.
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
