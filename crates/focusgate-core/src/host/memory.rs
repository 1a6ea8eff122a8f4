//! In-memory host implementations.
//!
//! Used by the test suites and by embedders that keep state elsewhere.
//! Every implementation is inspectable: alarms expose what is pending,
//! the notifier records what was shown.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{AlarmScheduler, ChangeListener, KeyValueStore, Notifier, RuleEngine, StorageChange};
use crate::error::{HostError, RuleEngineError, StorageError};
use crate::rules::BlockRule;

/// Key/value store over a HashMap.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let old = {
            let mut entries = self
                .entries
                .lock()
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
            entries.insert(key.to_string(), value.clone())
        };
        // Snapshot listeners before invoking so a listener that writes
        // back into the store does not deadlock on the listener lock.
        let listeners: Vec<ChangeListener> = match self.listeners.lock() {
            Ok(l) => l.clone(),
            Err(_) => Vec::new(),
        };
        let change = StorageChange {
            key: key.to_string(),
            old,
            new: Some(value),
        };
        for listener in listeners {
            listener(&change);
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(listener);
        }
    }
}

/// Alarm scheduler that records pending alarms without firing them.
#[derive(Default)]
pub struct MemoryAlarms {
    pending: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryAlarms {
    pub fn new() -> Self {
        Self::default()
    }

    /// The deadline currently scheduled under `name`, if any.
    pub fn pending(&self, name: &str) -> Option<DateTime<Utc>> {
        self.pending.lock().ok()?.get(name).copied()
    }
}

impl AlarmScheduler for MemoryAlarms {
    fn schedule(&self, name: &str, at: DateTime<Utc>) -> Result<(), HostError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| HostError::Alarm(e.to_string()))?;
        pending.insert(name.to_string(), at);
        Ok(())
    }

    fn clear(&self, name: &str) -> Result<(), HostError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| HostError::Alarm(e.to_string()))?;
        pending.remove(name);
        Ok(())
    }
}

/// Rule engine that holds the active rule set in memory.
#[derive(Default)]
pub struct MemoryRuleEngine {
    rules: Mutex<Vec<BlockRule>>,
}

impl MemoryRuleEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleEngine for MemoryRuleEngine {
    fn active_rules(&self) -> Result<Vec<BlockRule>, RuleEngineError> {
        let rules = self
            .rules
            .lock()
            .map_err(|e| RuleEngineError::QueryFailed(e.to_string()))?;
        Ok(rules.clone())
    }

    fn replace_rules(
        &self,
        remove_ids: Vec<u32>,
        add_rules: Vec<BlockRule>,
    ) -> Result<(), RuleEngineError> {
        let mut rules = self
            .rules
            .lock()
            .map_err(|e| RuleEngineError::UpdateRejected(e.to_string()))?;
        rules.retain(|r| !remove_ids.contains(&r.id));
        rules.extend(add_rules);
        Ok(())
    }
}

/// Notifier that records every notification shown.
#[derive(Default)]
pub struct MemoryNotifier {
    shown: Mutex<Vec<(String, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), HostError> {
        let mut shown = self
            .shown
            .lock()
            .map_err(|e| HostError::Notification(e.to_string()))?;
        shown.push((title.to_string(), message.to_string()));
        Ok(())
    }
}
