//! Target backends.
//!
//! Every backend walks the policy groups in order, runs the capability
//! pre-filter on each top-level rule, lowers what it can, and closes the
//! artifact with a catch-all that routes to the default policy.

mod clash;
mod quantumultx;
mod singbox;
mod surge;
mod v2ray;

pub use clash::{ClashBackend, ClashOptions, PROVIDERS, RULE_SET_REFS};
pub use quantumultx::QuantumultXBackend;
pub use singbox::SingBoxBackend;
pub use surge::SurgeBackend;
pub use v2ray::V2RayBackend;

use ruleforge_core::{DEFAULT_POLICY, DEFAULT_V2RAY_DOMAIN_STRATEGY};
use ruleforge_dsl::LogicalOp;

use crate::capability::Capability;
use crate::error::CompileError;
use crate::policy::PolicyRules;
use crate::result::CompileResult;
use crate::target::Target;

/// Lowers policy groups into one target's artifact text.
pub trait Backend: Send + Sync {
    fn target(&self) -> Target;

    /// `header` is free text, rendered as a comment in the target's syntax.
    fn compile(
        &self,
        policies: &[PolicyRules],
        capability: &Capability,
        header: &str,
    ) -> Result<CompileResult, CompileError>;
}

/// Why a backend dropped a rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unsupported {
    #[error("capability '{capability}' does not support: {missing}")]
    Capability { capability: String, missing: String },

    #[error("{target} cannot express logical operator {op}")]
    Logical { target: Target, op: LogicalOp },

    #[error("{target} has no mapping for rule type {rule_type}")]
    RuleType { target: Target, rule_type: String },

    #[error("invalid DST-PORT value '{0}'")]
    Port(String),

    #[error("{target} cannot escape the comma in '{field}'")]
    Comma { target: Target, field: String },
}

/// Knobs shared by all backends, plus the target-specific ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Policy of the trailing catch-all.
    pub default_policy: String,
    pub clash: ClashOptions,
    pub v2ray_domain_strategy: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            default_policy: DEFAULT_POLICY.to_string(),
            clash: ClashOptions::default(),
            v2ray_domain_strategy: DEFAULT_V2RAY_DOMAIN_STRATEGY.to_string(),
        }
    }
}

/// Construct the backend for `target`.
pub fn backend_for(target: Target, options: &CompileOptions) -> Box<dyn Backend> {
    let default_policy = options.default_policy.clone();
    match target {
        Target::Clash => Box::new(ClashBackend::new(options.clash.clone(), default_policy)),
        Target::Surge => Box::new(SurgeBackend::new(default_policy)),
        Target::QuantumultX => Box::new(QuantumultXBackend::new(default_policy)),
        Target::SingBox => Box::new(SingBoxBackend::new(default_policy)),
        Target::V2Ray => Box::new(V2RayBackend::new(
            default_policy,
            options.v2ray_domain_strategy.clone(),
        )),
    }
}

/// Header as `# `-prefixed lines; a blank header yields nothing.
pub(crate) fn comment_lines(header: &str) -> Vec<String> {
    if header.trim().is_empty() {
        return Vec::new();
    }
    header
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                "#".to_string()
            } else {
                format!("# {line}")
            }
        })
        .collect()
}

/// Fails when `field` holds a literal comma, which line formats cannot escape.
pub(crate) fn comma_free(target: Target, field: &str) -> Result<(), Unsupported> {
    if field.contains(',') {
        Err(Unsupported::Comma {
            target,
            field: field.to_string(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use ruleforge_dsl::parse_rule;

    use crate::policy::PolicyRules;

    /// Build a policy group from DSL lines.
    pub fn group(policy: &str, lines: &[&str]) -> PolicyRules {
        let rules = lines.iter().map(|l| parse_rule(l).unwrap()).collect();
        PolicyRules::new(policy, rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::rule_count;
    use test_support::group;

    #[test]
    fn header_becomes_comments() {
        let lines = comment_lines("generated\n\nby ruleforge");
        assert_eq!(lines, vec!["# generated", "#", "# by ruleforge"]);
        assert!(comment_lines("").is_empty());
        assert!(comment_lines("  ").is_empty());
    }

    #[test]
    fn every_backend_conserves_rule_count() {
        let policies = vec![
            group(
                "PROXY",
                &[
                    "DOMAIN-SUFFIX,google.com",
                    "AND,((DOMAIN,a.com),(USER-AGENT,Foo))",
                    "DST-PORT,nope",
                    "IP-ASN,13335",
                    "URL-REGEX,^https?://a\\,b",
                ],
            ),
            group("DIRECT", &["GEOIP,CN", "DOMAIN-WILDCARD,*.lan", "SCRIPT,x"]),
        ];
        let options = CompileOptions::default();
        for target in Target::ALL {
            let backend = backend_for(target, &options);
            assert_eq!(backend.target(), target);
            let cap = Capability::preset(target);
            let result = backend.compile(&policies, &cap, "hdr").unwrap();
            assert_eq!(
                result.stats.emitted() + result.stats.skipped(),
                rule_count(&policies) + 1,
                "{target}"
            );
            assert_eq!(result.warnings.len(), result.stats.skipped(), "{target}");
        }
    }

    #[test]
    fn every_backend_emits_catch_all_for_empty_input() {
        let options = CompileOptions {
            default_policy: "FALLBACK".into(),
            ..CompileOptions::default()
        };
        for target in Target::ALL {
            let backend = backend_for(target, &options);
            let result = backend
                .compile(&[], &Capability::preset(target), "")
                .unwrap();
            assert_eq!(result.stats.emitted(), 1, "{target}");
            assert!(result.warnings.is_empty());
            assert!(result.text.contains("FALLBACK"), "{target}: {}", result.text);
        }
    }
}
