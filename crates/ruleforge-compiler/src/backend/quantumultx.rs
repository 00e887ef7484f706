//! Quantumult X `[filter]` section.

use ruleforge_dsl::{Atom, Rule};

use super::{Backend, Unsupported, comma_free, comment_lines};
use crate::capability::Capability;
use crate::error::CompileError;
use crate::policy::PolicyRules;
use crate::result::{CompileResult, Lowering};
use crate::target::Target;

/// Flat filter list: renamed matcher keywords, no boolean syntax.
#[derive(Debug, Clone)]
pub struct QuantumultXBackend {
    default_policy: String,
}

impl QuantumultXBackend {
    pub fn new(default_policy: impl Into<String>) -> Self {
        Self {
            default_policy: default_policy.into(),
        }
    }
}

fn filter_keyword(rule_type: &str) -> Option<&'static str> {
    match rule_type {
        "DOMAIN" => Some("HOST"),
        "DOMAIN-SUFFIX" => Some("HOST-SUFFIX"),
        "DOMAIN-KEYWORD" => Some("HOST-KEYWORD"),
        "DOMAIN-WILDCARD" => Some("HOST-WILDCARD"),
        "URL-REGEX" => Some("URL-REGEX"),
        "USER-AGENT" => Some("USER-AGENT"),
        _ => None,
    }
}

impl Backend for QuantumultXBackend {
    fn target(&self) -> Target {
        Target::QuantumultX
    }

    fn compile(
        &self,
        policies: &[PolicyRules],
        capability: &Capability,
        header: &str,
    ) -> Result<CompileResult, CompileError> {
        let mut lowering = Lowering::new(Target::QuantumultX);
        let mut lines = comment_lines(header);
        lines.push("[filter]".to_string());

        for group in policies {
            let policy = group.policy();
            for rule in group.rules() {
                if !lowering.admit(capability, rule, policy) {
                    continue;
                }
                let rendered = match rule {
                    Rule::Atom(atom) => render_atom(atom, policy),
                    Rule::Logical(logical) => Err(Unsupported::Logical {
                        target: Target::QuantumultX,
                        op: logical.op(),
                    }),
                };
                match rendered {
                    Ok(line) => {
                        lines.push(line);
                        lowering.emit();
                    }
                    Err(reason) => lowering.skip(rule, policy, &reason),
                }
            }
        }

        lines.push(format!("FINAL,{}", self.default_policy));
        lowering.emit();

        let mut text = lines.join("\n");
        text.push('\n');
        Ok(lowering.finish(text))
    }
}

fn render_atom(atom: &Atom, policy: &str) -> Result<String, Unsupported> {
    comma_free(Target::QuantumultX, policy)?;
    let mut line = if atom.is_final() {
        format!("FINAL,{policy}")
    } else {
        let rule_type = atom.canonical_type();
        let keyword = filter_keyword(&rule_type).ok_or(Unsupported::RuleType {
            target: Target::QuantumultX,
            rule_type: rule_type.clone(),
        })?;
        comma_free(Target::QuantumultX, atom.value())?;
        format!("{keyword},{},{policy}", atom.value())
    };
    for option in atom.options() {
        comma_free(Target::QuantumultX, option)?;
        line.push(',');
        line.push_str(option);
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::group;

    fn compile_with(cap: &Capability, policies: &[PolicyRules]) -> CompileResult {
        QuantumultXBackend::new("PROXY")
            .compile(policies, cap, "qx")
            .unwrap()
    }

    #[test]
    fn logical_is_skipped_with_warning() {
        let policies = [group("PROXY", &["AND,((DOMAIN,a.com),(USER-AGENT,Foo))"])];
        // Enable the operator so the structural check is what rejects it.
        let cap = Capability::preset(Target::QuantumultX).with_overrides([("AND", true)]);
        let result = compile_with(&cap, &policies);
        assert_eq!(result.stats.skipped(), 1);
        assert_eq!(result.stats.emitted(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].reason.contains("AND"));
        assert_eq!(result.text, "# qx\n[filter]\nFINAL,PROXY\n");

        let result = compile_with(&Capability::preset(Target::QuantumultX), &policies);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].reason.contains("AND"));
    }

    #[test]
    fn renames_matchers() {
        let result = compile_with(
            &Capability::preset(Target::QuantumultX),
            &[group(
                "Streaming",
                &[
                    "DOMAIN,a.com",
                    "DOMAIN-SUFFIX,b.com,force-remote-dns",
                    "DOMAIN-KEYWORD,netflix",
                    "DOMAIN-WILDCARD,*.c.com",
                    "USER-AGENT,Instagram*",
                    "URL-REGEX,^https?://ads\\.",
                ],
            )],
        );
        let body: Vec<_> = result.text.lines().skip(2).collect();
        assert_eq!(
            body,
            vec![
                "HOST,a.com,Streaming",
                "HOST-SUFFIX,b.com,Streaming,force-remote-dns",
                "HOST-KEYWORD,netflix,Streaming",
                "HOST-WILDCARD,*.c.com,Streaming",
                "USER-AGENT,Instagram*,Streaming",
                "URL-REGEX,^https?://ads\\.,Streaming",
                "FINAL,PROXY",
            ]
        );
    }

    #[test]
    fn unmapped_types_are_skipped_even_when_enabled() {
        let cap = Capability::preset(Target::QuantumultX).with_overrides([("GEOIP", true)]);
        let result = compile_with(&cap, &[group("DIRECT", &["GEOIP,CN", "IP-CIDR,10.0.0.0/8"])]);
        assert_eq!(result.stats.skipped(), 2);
        assert!(result.warnings[0].reason.contains("GEOIP"));
        assert!(result.warnings[1].reason.contains("IP-CIDR"));
    }

    #[test]
    fn policy_with_comma_is_skipped() {
        let result = compile_with(
            &Capability::preset(Target::QuantumultX),
            &[group("A,B", &["DOMAIN,a.com", "FINAL"])],
        );
        assert_eq!(result.text, "# qx\n[filter]\nFINAL,PROXY\n");
        assert_eq!(result.stats.skipped(), 2);
        assert!(result.warnings.iter().all(|w| w.reason.contains("comma")));
    }

    #[test]
    fn user_final_is_kept() {
        let result = compile_with(
            &Capability::preset(Target::QuantumultX),
            &[group("DIRECT", &["FINAL"])],
        );
        assert!(result.text.ends_with("FINAL,DIRECT\nFINAL,PROXY\n"));
        assert_eq!(result.stats.emitted(), 2);
    }
}
