//! Session keyed flash message store.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tracing::debug;

use crudhub_core::config::flash::FlashConfig;
use crudhub_core::traits::FlashSink;
use crudhub_core::types::{FlashKind, FlashMessage};

/// Pending flash messages of every session.
///
/// Sessions idle past the configured time, or pushed out once the store is
/// full, lose their messages.
#[derive(Debug, Clone)]
pub struct FlashStore {
    /// Session ID → queued messages, oldest first.
    bags: Cache<String, Vec<FlashMessage>>,
}

impl FlashStore {
    /// Creates a store with the default limits.
    pub fn new() -> Self {
        Self::from_config(&FlashConfig::default())
    }

    /// Creates a store from configuration.
    pub fn from_config(config: &FlashConfig) -> Self {
        Self::with_limits(
            config.max_sessions,
            Duration::from_secs(config.time_to_idle_seconds),
        )
    }

    /// Creates a store holding at most `max_sessions` bags, each dropped
    /// after `time_to_idle` without access.
    pub fn with_limits(max_sessions: u64, time_to_idle: Duration) -> Self {
        let bags = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(time_to_idle)
            .build();
        Self { bags }
    }

    /// The bag of `session`, usable as an action's [`FlashSink`].
    pub fn bag(self: &Arc<Self>, session: impl Into<String>) -> FlashBag {
        FlashBag {
            store: Arc::clone(self),
            session: session.into(),
        }
    }

    /// Queues a message for `session`.
    pub fn add(&self, session: &str, kind: FlashKind, message: impl Into<String>) {
        let message = FlashMessage::new(kind, message);
        self.bags
            .entry(session.to_string())
            .and_upsert_with(|existing| {
                let mut messages = existing.map(|entry| entry.into_value()).unwrap_or_default();
                messages.push(message);
                messages
            });
    }

    /// Messages of `session` without consuming them.
    pub fn peek(&self, session: &str) -> Vec<FlashMessage> {
        self.bags.get(session).unwrap_or_default()
    }

    /// Removes and returns the messages of `session`.
    pub fn take(&self, session: &str) -> Vec<FlashMessage> {
        self.bags.remove(session).unwrap_or_default()
    }

    /// Number of sessions with pending messages.
    pub fn session_count(&self) -> u64 {
        self.bags.run_pending_tasks();
        self.bags.entry_count()
    }
}

impl Default for FlashStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The flash bag of one session.
#[derive(Debug, Clone)]
pub struct FlashBag {
    store: Arc<FlashStore>,
    session: String,
}

impl FlashBag {
    /// The session this bag belongs to.
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Removes and returns this session's messages.
    pub fn take(&self) -> Vec<FlashMessage> {
        self.store.take(&self.session)
    }
}

impl FlashSink for FlashBag {
    fn add(&self, kind: FlashKind, message: String) {
        debug!(session = %self.session, kind = %kind, message = %message, "Queued flash message");
        self.store.add(&self.session, kind, message);
    }

    fn take_pending(&self) -> Vec<FlashMessage> {
        self.take()
    }
}
