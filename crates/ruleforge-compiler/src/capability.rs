//! Per-target capability flags.

use std::collections::BTreeMap;

use ruleforge_dsl::Rule;

use crate::target::Target;

const DOMAIN_TYPES: [&str; 4] = ["DOMAIN", "DOMAIN-SUFFIX", "DOMAIN-KEYWORD", "DOMAIN-WILDCARD"];
const LOGICAL_OPS: [&str; 3] = ["AND", "OR", "NOT"];

/// Named set of rule types and operators a target is configured to express.
///
/// Keys are canonicalised (trimmed, upper-cased) on insert and on lookup.
/// Absent keys are unsupported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    name: String,
    flags: BTreeMap<String, bool>,
}

impl Capability {
    pub fn new<K: AsRef<str>>(
        name: impl Into<String>,
        flags: impl IntoIterator<Item = (K, bool)>,
    ) -> Self {
        Self {
            name: name.into(),
            flags: flags
                .into_iter()
                .map(|(k, v)| (canonical_key(k.as_ref()), v))
                .collect(),
        }
    }

    /// Built-in flags matching what `target`'s lowering table can express.
    pub fn preset(target: Target) -> Self {
        let mut keys: Vec<&str> = vec!["FINAL"];
        match target {
            Target::Clash | Target::Surge => {
                keys.extend(DOMAIN_TYPES);
                keys.extend([
                    "IP-CIDR",
                    "IP-ASN",
                    "GEOIP",
                    "DST-PORT",
                    "URL-REGEX",
                    "USER-AGENT",
                    "SCRIPT",
                    "RULE-SET",
                    "DOMAIN-SET",
                ]);
                keys.extend(LOGICAL_OPS);
            }
            Target::QuantumultX => {
                keys.extend(DOMAIN_TYPES);
                keys.extend(["URL-REGEX", "USER-AGENT"]);
            }
            Target::SingBox => {
                keys.extend(DOMAIN_TYPES);
                keys.extend(["URL-REGEX", "IP-CIDR", "GEOIP", "DST-PORT"]);
            }
            Target::V2Ray => {
                keys.extend(["DOMAIN", "DOMAIN-SUFFIX", "DOMAIN-KEYWORD"]);
                keys.extend(["IP-CIDR", "GEOIP", "DST-PORT"]);
            }
        }
        Self::new(target.name(), keys.into_iter().map(|k| (k, true)))
    }

    /// Apply overrides on top of the current flags.
    pub fn with_overrides<K: AsRef<str>>(
        mut self,
        overrides: impl IntoIterator<Item = (K, bool)>,
    ) -> Self {
        for (key, enabled) in overrides {
            self.flags.insert(canonical_key(key.as_ref()), enabled);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supports(&self, key: &str) -> bool {
        self.flags
            .get(&canonical_key(key))
            .copied()
            .unwrap_or(false)
    }

    /// Required keys of `rule` (nested ones included) that are not supported.
    pub fn missing(&self, rule: &Rule) -> Vec<String> {
        rule.required_capabilities()
            .into_iter()
            .filter(|key| !self.supports(key))
            .collect()
    }

    pub fn is_fully_supported(&self, rule: &Rule) -> bool {
        rule.required_capabilities()
            .iter()
            .all(|key| self.supports(key))
    }

    /// Enabled keys in sorted order.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(key, _)| key.as_str())
    }
}

/// True iff every type and operator `rule` requires is supported by `capability`.
pub fn rule_is_fully_supported(capability: &Capability, rule: &Rule) -> bool {
    capability.is_fully_supported(rule)
}

fn canonical_key(key: &str) -> String {
    key.trim().to_uppercase()
}
