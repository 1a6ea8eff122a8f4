//! Rule synchronization.
//!
//! Regenerates the full rule set from the blocked list and hands it to
//! the rule-matching engine as one atomic replace. There is no diffing
//! and no retry: a failed sync is logged and the rules stay stale until
//! the next trigger.

use std::sync::Arc;

use super::{build_rules, MAX_RULES};
use crate::host::RuleEngine;

#[derive(Clone)]
pub struct RuleSynchronizer {
    engine: Arc<dyn RuleEngine>,
}

impl RuleSynchronizer {
    pub fn new(engine: Arc<dyn RuleEngine>) -> Self {
        Self { engine }
    }

    /// Replace the active rule set with rules built from `list`.
    ///
    /// Fire-and-forget: engine failures are logged, never propagated,
    /// and never roll back the list mutation that triggered the sync.
    pub fn apply_sync(&self, list: &[String]) {
        let current = match self.engine.active_rules() {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(error = %e, "failed to query active rules, skipping sync");
                return;
            }
        };
        let remove_ids: Vec<u32> = current.iter().map(|r| r.id).collect();
        let mut add_rules = build_rules(list);
        add_rules.truncate(MAX_RULES);
        let count = add_rules.len();
        match self.engine.replace_rules(remove_ids, add_rules) {
            Ok(()) => tracing::debug!(count, "rule set replaced"),
            Err(e) => tracing::warn!(error = %e, "rule update rejected, rules left stale"),
        }
    }
}
