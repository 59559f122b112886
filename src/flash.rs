// Flash notifier - transient user-facing messages
//
// Every component reports through one shared handle. The TUI shows the newest
// live message as a toast; headless mode only sees the tracing output. Nothing
// in the panel reads flashes back to make decisions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Maximum number of flashes kept around for display
const MAX_FLASHES: usize = 32;

/// Severity of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Info => "info",
            FlashLevel::Error => "error",
        }
    }
}

/// A single flashed message
#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
    pub created_at: Instant,
}

impl FlashMessage {
    /// Whether the message is older than `ttl`
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Process-wide, write-only notification channel
///
/// Cloning yields another handle onto the same queue.
#[derive(Clone, Default)]
pub struct Flash {
    entries: Arc<Mutex<VecDeque<FlashMessage>>>,
}

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flash an informational message
    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.push(FlashLevel::Info, message);
    }

    /// Flash an error message
    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.push(FlashLevel::Error, message);
    }

    fn push(&self, level: FlashLevel, message: String) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.len() >= MAX_FLASHES {
            entries.pop_front();
        }
        entries.push_back(FlashMessage {
            level,
            message,
            created_at: Instant::now(),
        });
    }

    /// Most recent message that is still within `ttl`
    pub fn latest(&self, ttl: Duration) -> Option<FlashMessage> {
        let entries = self.entries.lock().ok()?;
        entries.back().filter(|m| !m.is_expired(ttl)).cloned()
    }

    /// Snapshot of every retained message, oldest first
    #[cfg(test)]
    pub fn history(&self) -> Vec<FlashMessage> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop messages older than `ttl`
    pub fn prune(&self, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|m| !m.is_expired(ttl));
        }
    }
}
