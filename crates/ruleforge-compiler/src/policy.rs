//! Policy groups: the ordered input every backend consumes.

use ruleforge_dsl::Rule;

/// Rules that resolve to one policy, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRules {
    policy: String,
    rules: Vec<Rule>,
}

impl PolicyRules {
    pub fn new(policy: impl AsRef<str>, rules: Vec<Rule>) -> Self {
        Self {
            policy: normalize_policy(policy.as_ref()).to_string(),
            rules,
        }
    }

    pub fn policy(&self) -> &str {
        &self.policy
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

pub fn normalize_policy(policy: &str) -> &str {
    policy.trim()
}

/// Total number of top-level rules across all groups.
pub fn rule_count(policies: &[PolicyRules]) -> usize {
    policies.iter().map(|p| p.rules.len()).sum()
}
