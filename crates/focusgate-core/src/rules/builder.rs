//! Block rule construction.
//!
//! One rule per blocked domain, shaped like the host engine's dynamic
//! rule records. Rule ids are derived from the entry's position in the
//! original list (`index + 1`), so entries that fail normalization leave
//! gaps rather than renumbering everything after them; ids stay stable
//! across edits for anything holding on to them.

use serde::{Deserialize, Serialize};

use super::normalize_domain;

/// Upper bound on rules emitted in one sync.
pub const MAX_RULES: usize = 5000;

/// What a matching rule does. Only blocking is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleAction {
    Block,
}

/// Request classes a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Top-level page navigations only, not sub-resources.
    MainFrame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    /// Domain-anchored pattern: `||domain^` matches the domain and any
    /// subdomain at a hostname boundary.
    pub url_filter: String,
    pub resource_types: Vec<ResourceType>,
}

/// A single request-blocking rule, as held by the rule-matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRule {
    pub id: u32,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

impl BlockRule {
    fn for_domain(id: u32, domain: &str) -> Self {
        Self {
            id,
            priority: 1,
            action: RuleAction::Block,
            condition: RuleCondition {
                url_filter: format!("||{domain}^"),
                resource_types: vec![ResourceType::MainFrame],
            },
        }
    }
}

/// Build block rules from a raw domain list.
///
/// Entries that fail normalization are skipped without emitting a rule.
pub fn build_rules(list: &[String]) -> Vec<BlockRule> {
    let mut rules = Vec::with_capacity(list.len());
    for (i, entry) in list.iter().enumerate() {
        let Some(domain) = normalize_domain(entry) else {
            continue;
        };
        rules.push(BlockRule::for_domain(i as u32 + 1, &domain));
    }
    rules
}
