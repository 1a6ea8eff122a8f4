//! Host collaborator seams.
//!
//! The engine never touches platform facilities directly. Persisted
//! key/value storage, the one-shot alarm scheduler, the rule-matching
//! engine, and user notifications are all injected behind these traits,
//! so tests run against the in-memory implementations and embedders can
//! wire up whatever their platform provides.

mod memory;
mod stored_rules;
mod tokio_alarms;

pub use memory::{MemoryAlarms, MemoryNotifier, MemoryRuleEngine, MemoryStore};
pub use stored_rules::{StoredRuleEngine, RULES_KEY};
pub use tokio_alarms::TokioAlarms;

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{HostError, RuleEngineError, StorageError};
use crate::rules::BlockRule;

/// A committed write to the key/value store, delivered to subscribers.
#[derive(Debug, Clone)]
pub struct StorageChange {
    pub key: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// Listener invoked after every committed write.
pub type ChangeListener = Arc<dyn Fn(&StorageChange) + Send + Sync>;

/// Persisted key/value storage with change notification.
///
/// Values are JSON. A missing key is `Ok(None)`, never an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Register a listener. Listeners fire after the write is committed
    /// and must not assume any ordering among themselves.
    fn subscribe(&self, listener: ChangeListener);
}

/// Named one-shot wake-ups at an absolute wall-clock instant.
///
/// Scheduling under a name that already has a pending alarm replaces it.
pub trait AlarmScheduler: Send + Sync {
    fn schedule(&self, name: &str, at: DateTime<Utc>) -> Result<(), HostError>;

    fn clear(&self, name: &str) -> Result<(), HostError>;
}

/// The external engine that enforces block rules on navigations.
pub trait RuleEngine: Send + Sync {
    fn active_rules(&self) -> Result<Vec<BlockRule>, RuleEngineError>;

    /// Remove and add in one combined operation, so there is no window
    /// with zero rules active between removal and addition.
    fn replace_rules(
        &self,
        remove_ids: Vec<u32>,
        add_rules: Vec<BlockRule>,
    ) -> Result<(), RuleEngineError>;
}

/// Fire-and-forget user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str) -> Result<(), HostError>;
}
