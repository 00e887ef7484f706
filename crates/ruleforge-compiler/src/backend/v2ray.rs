//! v2ray `routing.rules` field rules.

use ruleforge_dsl::{Atom, Rule};
use serde::Serialize;

use super::{Backend, Unsupported};
use crate::capability::Capability;
use crate::error::CompileError;
use crate::policy::PolicyRules;
use crate::port::PortSpec;
use crate::result::{CompileResult, Lowering};
use crate::target::Target;

#[derive(Debug, Clone)]
pub struct V2RayBackend {
    default_policy: String,
    domain_strategy: String,
}

impl V2RayBackend {
    pub fn new(default_policy: impl Into<String>, domain_strategy: impl Into<String>) -> Self {
        Self {
            default_policy: default_policy.into(),
            domain_strategy: domain_strategy.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "_comment", skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    routing: Routing<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Routing<'a> {
    domain_strategy: &'a str,
    rules: Vec<FieldRule>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldRule {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ip: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<String>,
    outbound_tag: String,
}

impl FieldRule {
    fn catch_all(outbound: &str) -> Self {
        Self {
            kind: "field",
            domain: Vec::new(),
            ip: Vec::new(),
            port: None,
            outbound_tag: outbound.to_string(),
        }
    }
}

impl Backend for V2RayBackend {
    fn target(&self) -> Target {
        Target::V2Ray
    }

    fn compile(
        &self,
        policies: &[PolicyRules],
        capability: &Capability,
        header: &str,
    ) -> Result<CompileResult, CompileError> {
        let mut lowering = Lowering::new(Target::V2Ray);
        let mut rules = Vec::new();

        for group in policies {
            let policy = group.policy();
            for rule in group.rules() {
                if !lowering.admit(capability, rule, policy) {
                    continue;
                }
                let lowered = match rule {
                    Rule::Atom(atom) => lower_atom(atom, policy),
                    Rule::Logical(logical) => Err(Unsupported::Logical {
                        target: Target::V2Ray,
                        op: logical.op(),
                    }),
                };
                match lowered {
                    Ok(field) => {
                        rules.push(field);
                        lowering.emit();
                    }
                    Err(reason) => lowering.skip(rule, policy, &reason),
                }
            }
        }

        rules.push(FieldRule::catch_all(&self.default_policy));
        lowering.emit();

        let doc = Document {
            comment: (!header.trim().is_empty()).then_some(header),
            routing: Routing {
                domain_strategy: &self.domain_strategy,
                rules,
            },
        };
        let mut text = serde_json::to_string_pretty(&doc)?;
        text.push('\n');
        Ok(lowering.finish(text))
    }
}

fn lower_atom(atom: &Atom, outbound: &str) -> Result<FieldRule, Unsupported> {
    let mut out = FieldRule::catch_all(outbound);
    if atom.is_final() {
        return Ok(out);
    }
    let value = atom.value();
    match atom.canonical_type().as_str() {
        // v2ray has no exact-host tag distinct from the suffix one.
        "DOMAIN" | "DOMAIN-SUFFIX" => out.domain.push(format!("domain:{value}")),
        "DOMAIN-KEYWORD" => out.domain.push(format!("keyword:{value}")),
        "IP-CIDR" => out.ip.push(value.to_string()),
        "GEOIP" => out.ip.push(format!("geoip:{value}")),
        "DST-PORT" => {
            let spec: PortSpec = value
                .parse()
                .map_err(|_| Unsupported::Port(value.to_string()))?;
            out.port = Some(spec.to_string());
        }
        other => {
            return Err(Unsupported::RuleType {
                target: Target::V2Ray,
                rule_type: other.to_string(),
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::backend::test_support::group;

    fn compile(cap: &Capability, policies: &[PolicyRules]) -> (CompileResult, Value) {
        let result = V2RayBackend::new("PROXY", "IPIfNonMatch")
            .compile(policies, cap, "v2")
            .unwrap();
        let doc: Value = serde_json::from_str(&result.text).unwrap();
        (result, doc)
    }

    #[test]
    fn field_rules() {
        let (result, doc) = compile(
            &Capability::preset(Target::V2Ray),
            &[group(
                "DIRECT",
                &[
                    "DOMAIN,a.com",
                    "DOMAIN-SUFFIX,b.com",
                    "DOMAIN-KEYWORD,cdn",
                    "IP-CIDR,10.0.0.0/8",
                    "GEOIP,CN",
                    "DST-PORT,80-90",
                ],
            )],
        );
        assert!(result.warnings.is_empty());
        assert_eq!(doc["_comment"], "v2");
        assert_eq!(doc["routing"]["domainStrategy"], "IPIfNonMatch");
        let rules = doc["routing"]["rules"].as_array().unwrap();
        assert_eq!(
            rules[0],
            json!({"type": "field", "domain": ["domain:a.com"], "outboundTag": "DIRECT"})
        );
        assert_eq!(rules[1]["domain"], json!(["domain:b.com"]));
        assert_eq!(rules[2]["domain"], json!(["keyword:cdn"]));
        assert_eq!(rules[3]["ip"], json!(["10.0.0.0/8"]));
        assert_eq!(rules[4]["ip"], json!(["geoip:CN"]));
        assert_eq!(rules[5]["port"], json!("80-90"));
        assert_eq!(rules[6], json!({"type": "field", "outboundTag": "PROXY"}));
    }

    #[test]
    fn unsupported_types_are_skipped_even_when_enabled() {
        let cap = Capability::preset(Target::V2Ray)
            .with_overrides([("DOMAIN-WILDCARD", true), ("URL-REGEX", true), ("NOT", true)]);
        let (result, doc) = compile(
            &cap,
            &[group(
                "PROXY",
                &["DOMAIN-WILDCARD,*.a.com", "URL-REGEX,^x", "NOT,((GEOIP,CN))", "DST-PORT,x"],
            )],
        );
        assert_eq!(result.stats.skipped(), 4);
        assert_eq!(result.stats.emitted(), 1);
        assert_eq!(doc["routing"]["rules"].as_array().unwrap().len(), 1);
        assert!(result.warnings.iter().all(|w| w.source == "v2ray"));
    }

    #[test]
    fn user_final_becomes_unconditional_rule() {
        let (_, doc) = compile(&Capability::preset(Target::V2Ray), &[group("DIRECT", &["FINAL"])]);
        assert_eq!(
            doc["routing"]["rules"][0],
            json!({"type": "field", "outboundTag": "DIRECT"})
        );
    }
}
