mod builder;
mod normalize;
mod sync;

pub use builder::{build_rules, BlockRule, ResourceType, RuleAction, RuleCondition, MAX_RULES};
pub use normalize::normalize_domain;
pub use sync::RuleSynchronizer;
