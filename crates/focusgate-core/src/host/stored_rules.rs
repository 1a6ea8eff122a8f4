//! Rule engine persisted in the key/value store.
//!
//! Stands in for a platform rule-matching engine when there is none:
//! the active rule set lives under its own storage key, and the replace
//! is a single write so removal and addition cannot be observed apart.

use serde_json::Value;
use std::sync::Arc;

use super::{KeyValueStore, RuleEngine};
use crate::error::RuleEngineError;
use crate::rules::BlockRule;

/// Storage key for the active rule set.
pub const RULES_KEY: &str = "activeRules";

pub struct StoredRuleEngine {
    store: Arc<dyn KeyValueStore>,
}

impl StoredRuleEngine {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl RuleEngine for StoredRuleEngine {
    fn active_rules(&self) -> Result<Vec<BlockRule>, RuleEngineError> {
        match self.store.get(RULES_KEY) {
            Ok(Some(value)) => serde_json::from_value(value)
                .map_err(|e| RuleEngineError::QueryFailed(e.to_string())),
            Ok(None) => Ok(Vec::new()),
            Err(e) => Err(RuleEngineError::QueryFailed(e.to_string())),
        }
    }

    fn replace_rules(
        &self,
        remove_ids: Vec<u32>,
        add_rules: Vec<BlockRule>,
    ) -> Result<(), RuleEngineError> {
        let mut rules = self.active_rules()?;
        rules.retain(|r| !remove_ids.contains(&r.id));
        rules.extend(add_rules);
        let value: Value = serde_json::to_value(&rules)
            .map_err(|e| RuleEngineError::UpdateRejected(e.to_string()))?;
        self.store
            .set(RULES_KEY, value)
            .map_err(|e| RuleEngineError::UpdateRejected(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryStore;
    use crate::rules::build_rules;

    #[test]
    fn replace_survives_store_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let engine = StoredRuleEngine::new(store.clone());
        let rules = build_rules(&["a.com".to_string(), "b.com".to_string()]);
        engine.replace_rules(vec![], rules.clone()).unwrap();
        assert_eq!(engine.active_rules().unwrap(), rules);

        // Re-reading through a second engine over the same store.
        let other = StoredRuleEngine::new(store);
        assert_eq!(other.active_rules().unwrap(), rules);
    }

    #[test]
    fn remove_ids_are_honored() {
        let engine = StoredRuleEngine::new(Arc::new(MemoryStore::new()));
        let rules = build_rules(&["a.com".to_string(), "b.com".to_string()]);
        engine.replace_rules(vec![], rules).unwrap();
        engine.replace_rules(vec![1, 2], vec![]).unwrap();
        assert!(engine.active_rules().unwrap().is_empty());
    }
}
