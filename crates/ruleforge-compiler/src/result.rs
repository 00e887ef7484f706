//! Compilation output, warnings, and counters.

use std::collections::BTreeMap;

use ruleforge_dsl::Rule;
use serde::Serialize;
use tracing::debug;

use crate::backend::Unsupported;
use crate::capability::Capability;
use crate::target::Target;

/// A rule that was dropped instead of emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileWarning {
    /// Target that dropped the rule.
    pub source: String,
    pub policy: String,
    /// The dropped rule rendered back to DSL text.
    pub fragment: String,
    pub reason: String,
}

/// Named counters. `emitted` and `skipped` are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompileStats(BTreeMap<String, usize>);

impl CompileStats {
    pub const EMITTED: &'static str = "emitted";
    pub const SKIPPED: &'static str = "skipped";

    pub fn get(&self, counter: &str) -> usize {
        self.0.get(counter).copied().unwrap_or(0)
    }

    pub fn incr(&mut self, counter: &str) {
        *self.0.entry(counter.to_string()).or_insert(0) += 1;
    }

    pub fn emitted(&self) -> usize {
        self.get(Self::EMITTED)
    }

    pub fn skipped(&self) -> usize {
        self.get(Self::SKIPPED)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Artifact text plus everything that happened while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileResult {
    pub text: String,
    pub warnings: Vec<CompileWarning>,
    pub stats: CompileStats,
}

/// Bookkeeping shared by every backend during one `compile` call.
pub(crate) struct Lowering {
    target: Target,
    warnings: Vec<CompileWarning>,
    stats: CompileStats,
}

impl Lowering {
    pub(crate) fn new(target: Target) -> Self {
        let mut stats = CompileStats::default();
        stats.0.insert(CompileStats::EMITTED.to_string(), 0);
        stats.0.insert(CompileStats::SKIPPED.to_string(), 0);
        Self {
            target,
            warnings: Vec::new(),
            stats,
        }
    }

    /// Register a backend-specific counter so it is reported even at zero.
    pub(crate) fn track(&mut self, counter: &str) {
        self.stats.0.entry(counter.to_string()).or_insert(0);
    }

    pub(crate) fn emit(&mut self) {
        self.stats.incr(CompileStats::EMITTED);
    }

    pub(crate) fn bump(&mut self, counter: &str) {
        self.stats.incr(counter);
    }

    pub(crate) fn skip(&mut self, rule: &Rule, policy: &str, reason: &Unsupported) {
        debug!(target_name = %self.target, policy, rule = %rule, %reason, "rule skipped");
        self.stats.incr(CompileStats::SKIPPED);
        self.warnings.push(CompileWarning {
            source: self.target.name().to_string(),
            policy: policy.to_string(),
            fragment: rule.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Capability pre-filter. Records a skip and returns `false` when any
    /// required key is unsupported.
    pub(crate) fn admit(&mut self, capability: &Capability, rule: &Rule, policy: &str) -> bool {
        let missing = capability.missing(rule);
        if missing.is_empty() {
            return true;
        }
        let reason = Unsupported::Capability {
            capability: capability.name().to_string(),
            missing: missing.join(", "),
        };
        self.skip(rule, policy, &reason);
        false
    }

    pub(crate) fn finish(self, text: String) -> CompileResult {
        CompileResult {
            text,
            warnings: self.warnings,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use ruleforge_dsl::parse_rule;

    use super::*;

    #[test]
    fn fresh_stats_have_core_counters() {
        let result = Lowering::new(Target::Surge).finish(String::new());
        assert_eq!(result.stats.emitted(), 0);
        assert_eq!(result.stats.skipped(), 0);
        assert_eq!(result.stats.get("providers"), 0);
        let json = serde_json::to_string(&result.stats).unwrap();
        assert_eq!(json, r#"{"emitted":0,"skipped":0}"#);
    }

    #[test]
    fn admit_records_missing_keys() {
        let cap = Capability::new("quantumultx", [("DOMAIN", true)]);
        let rule = parse_rule("AND,((DOMAIN,a.com),(USER-AGENT,Foo))").unwrap();
        let mut lowering = Lowering::new(Target::QuantumultX);
        assert!(!lowering.admit(&cap, &rule, "PROXY"));

        let result = lowering.finish(String::new());
        assert_eq!(result.stats.skipped(), 1);
        let warning = &result.warnings[0];
        assert_eq!(warning.source, "quantumultx");
        assert_eq!(warning.policy, "PROXY");
        assert_eq!(warning.fragment, "AND,((DOMAIN,a.com),(USER-AGENT,Foo))");
        assert!(warning.reason.contains("AND"));
        assert!(warning.reason.contains("USER-AGENT"));
    }
}
