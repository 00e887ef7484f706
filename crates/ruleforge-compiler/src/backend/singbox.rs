//! sing-box `route.rules`.

use ruleforge_dsl::{Atom, Rule};
use serde::Serialize;
use tracing::debug;

use super::{Backend, Unsupported};
use crate::capability::Capability;
use crate::error::CompileError;
use crate::policy::PolicyRules;
use crate::port::PortSpec;
use crate::result::{CompileResult, Lowering};
use crate::target::Target;

#[derive(Debug, Clone)]
pub struct SingBoxBackend {
    default_policy: String,
}

impl SingBoxBackend {
    pub fn new(default_policy: impl Into<String>) -> Self {
        Self {
            default_policy: default_policy.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "_comment", skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    route: Route,
}

#[derive(Debug, Serialize)]
struct Route {
    rules: Vec<RouteRule>,
}

/// One route rule; a rule with no match fields matches everything.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
struct RouteRule {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain_suffix: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain_keyword: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain_regex: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ip_cidr: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    geoip: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    port: Vec<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    port_range: Vec<String>,
    outbound: String,
}

impl RouteRule {
    fn catch_all(outbound: &str) -> Self {
        Self {
            outbound: outbound.to_string(),
            ..Self::default()
        }
    }
}

impl Backend for SingBoxBackend {
    fn target(&self) -> Target {
        Target::SingBox
    }

    fn compile(
        &self,
        policies: &[PolicyRules],
        capability: &Capability,
        header: &str,
    ) -> Result<CompileResult, CompileError> {
        let mut lowering = Lowering::new(Target::SingBox);
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
                        target: Target::SingBox,
                        op: logical.op(),
                    }),
                };
                match lowered {
                    Ok(route_rule) => {
                        rules.push(route_rule);
                        lowering.emit();
                    }
                    Err(reason) => lowering.skip(rule, policy, &reason),
                }
            }
        }

        rules.push(RouteRule::catch_all(&self.default_policy));
        lowering.emit();

        let doc = Document {
            comment: (!header.trim().is_empty()).then_some(header),
            route: Route { rules },
        };
        let mut text = serde_json::to_string_pretty(&doc)?;
        text.push('\n');
        Ok(lowering.finish(text))
    }
}

fn lower_atom(atom: &Atom, outbound: &str) -> Result<RouteRule, Unsupported> {
    let mut out = RouteRule::catch_all(outbound);
    if atom.is_final() {
        return Ok(out);
    }
    let value = atom.value().to_string();
    match atom.canonical_type().as_str() {
        "DOMAIN" => out.domain.push(value),
        "DOMAIN-SUFFIX" => out.domain_suffix.push(value),
        "DOMAIN-KEYWORD" => out.domain_keyword.push(value),
        "DOMAIN-WILDCARD" => out.domain_regex.push(wildcard_to_regex(&value)),
        "URL-REGEX" => {
            debug!(pattern = %value, "URL-REGEX lowered to domain_regex");
            out.domain_regex.push(value);
        }
        "IP-CIDR" => out.ip_cidr.push(value),
        "GEOIP" => out.geoip.push(value),
        "DST-PORT" => match value.parse::<PortSpec>() {
            Ok(PortSpec::Single(port)) => out.port.push(port),
            Ok(PortSpec::Range(start, end)) => out.port_range.push(format!("{start}:{end}")),
            Err(_) => return Err(Unsupported::Port(value)),
        },
        other => {
            return Err(Unsupported::RuleType {
                target: Target::SingBox,
                rule_type: other.to_string(),
            });
        }
    }
    Ok(out)
}

/// `*.example.com` becomes `^.*\.example\.com$`.
pub(crate) fn wildcard_to_regex(pattern: &str) -> String {
    format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::backend::test_support::group;

    fn compile(policies: &[PolicyRules], header: &str) -> (CompileResult, Value) {
        let result = SingBoxBackend::new("PROXY")
            .compile(policies, &Capability::preset(Target::SingBox), header)
            .unwrap();
        let doc: Value = serde_json::from_str(&result.text).unwrap();
        (result, doc)
    }

    #[test]
    fn domain_suffix_rule() {
        let (result, doc) = compile(&[group("PROXY", &["DOMAIN-SUFFIX,example.com"])], "hdr");
        assert_eq!(doc["_comment"], "hdr");
        assert_eq!(
            doc["route"]["rules"][0],
            json!({"domain_suffix": ["example.com"], "outbound": "PROXY"})
        );
        assert_eq!(doc["route"]["rules"][1], json!({"outbound": "PROXY"}));
        assert_eq!(result.stats.emitted(), 2);
    }

    #[test]
    fn maps_every_supported_type() {
        let (result, doc) = compile(
            &[group(
                "DIRECT",
                &[
                    "DOMAIN,a.com",
                    "DOMAIN-KEYWORD,ads",
                    "DOMAIN-WILDCARD,*.lan",
                    "URL-REGEX,^ads\\.",
                    "IP-CIDR,10.0.0.0/8,no-resolve",
                    "GEOIP,CN",
                    "DST-PORT,443",
                    "DST-PORT,8000-9000",
                    "FINAL",
                ],
            )],
            "",
        );
        assert!(result.warnings.is_empty());
        assert!(doc.get("_comment").is_none());
        let rules = doc["route"]["rules"].as_array().unwrap();
        assert_eq!(rules[0]["domain"], json!(["a.com"]));
        assert_eq!(rules[1]["domain_keyword"], json!(["ads"]));
        assert_eq!(rules[2]["domain_regex"], json!(["^.*\\.lan$"]));
        assert_eq!(rules[3]["domain_regex"], json!(["^ads\\."]));
        assert_eq!(rules[4]["ip_cidr"], json!(["10.0.0.0/8"]));
        assert_eq!(rules[5]["geoip"], json!(["CN"]));
        assert_eq!(rules[6]["port"], json!([443]));
        assert_eq!(rules[7]["port_range"], json!(["8000:9000"]));
        assert_eq!(rules[8], json!({"outbound": "DIRECT"}));
        assert_eq!(rules[9], json!({"outbound": "PROXY"}));
    }

    #[test]
    fn bad_port_skips_only_that_rule() {
        let (result, doc) = compile(
            &[group("PROXY", &["DST-PORT,https", "DST-PORT,9-1", "DOMAIN,a.com"])],
            "",
        );
        assert_eq!(result.stats.skipped(), 2);
        assert_eq!(result.stats.emitted(), 2);
        assert!(result.warnings[0].reason.contains("https"));
        assert_eq!(doc["route"]["rules"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn logical_and_user_agent_are_skipped() {
        let cap = Capability::preset(Target::SingBox)
            .with_overrides([("OR", true), ("USER-AGENT", true)]);
        let result = SingBoxBackend::new("PROXY")
            .compile(
                &[group("PROXY", &["OR,((DOMAIN,a.com),(DOMAIN,b.com))", "USER-AGENT,Foo"])],
                &cap,
                "",
            )
            .unwrap();
        assert_eq!(result.stats.skipped(), 2);
        assert!(result.warnings[0].reason.contains("OR"));
        assert!(result.warnings[1].reason.contains("USER-AGENT"));
    }

    #[test]
    fn wildcard_regex_escapes_literals() {
        assert_eq!(wildcard_to_regex("*.example.com"), r"^.*\.example\.com$");
        assert_eq!(wildcard_to_regex("a+b*"), r"^a\+b.*$");
    }
}
