//! Clash / mihomo config fragment.
//!
//! Rules are not inlined. Each policy gets an HTTP `classical` rule-provider
//! pointing at its published rule list, and the top-level `rules` list holds
//! one `RULE-SET` reference per policy followed by `MATCH`.

use ruleforge_core::{CLASH_PROVIDER_PREFIX, DEFAULT_PROVIDER_CACHE_DIR, DEFAULT_PROVIDER_INTERVAL_SECS};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{Backend, comma_free, comment_lines};
use crate::capability::Capability;
use crate::error::CompileError;
use crate::policy::PolicyRules;
use crate::result::{CompileResult, Lowering};
use crate::target::Target;

/// Counter: distinct rule-providers declared.
pub const PROVIDERS: &str = "providers";
/// Counter: `RULE-SET` references written to `rules`.
pub const RULE_SET_REFS: &str = "rule_set_refs";

/// Where providers are fetched from and cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClashOptions {
    /// Raw-file root of the published repository; `/rules/<POLICY>.list` is appended.
    pub base_raw_url: String,
    /// Provider refresh interval in seconds.
    pub interval: u64,
    pub cache_dir: String,
}

impl Default for ClashOptions {
    fn default() -> Self {
        Self {
            base_raw_url: String::new(),
            interval: DEFAULT_PROVIDER_INTERVAL_SECS,
            cache_dir: DEFAULT_PROVIDER_CACHE_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClashBackend {
    options: ClashOptions,
    default_policy: String,
}

impl ClashBackend {
    pub fn new(options: ClashOptions, default_policy: impl Into<String>) -> Self {
        Self {
            options,
            default_policy: default_policy.into(),
        }
    }

    fn provider_for(&self, name: &str, policy: &str) -> RuleProvider {
        RuleProvider {
            kind: "http",
            behavior: "classical",
            url: format!(
                "{}/rules/{policy}.list",
                self.options.base_raw_url.trim_end_matches('/')
            ),
            path: format!(
                "{}/{name}.yaml",
                self.options.cache_dir.trim_end_matches('/')
            ),
            interval: self.options.interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct RuleProvider {
    #[serde(rename = "type")]
    kind: &'static str,
    behavior: &'static str,
    url: String,
    path: String,
    interval: u64,
}

/// Providers in declaration order.
#[derive(Debug, Default)]
struct ProviderMap(Vec<(String, RuleProvider)>);

impl ProviderMap {
    fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }
}

impl Serialize for ProviderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, provider) in &self.0 {
            map.serialize_entry(name, provider)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
struct Document {
    #[serde(rename = "rule-providers")]
    rule_providers: ProviderMap,
    rules: Vec<String>,
}

impl Backend for ClashBackend {
    fn target(&self) -> Target {
        Target::Clash
    }

    fn compile(
        &self,
        policies: &[PolicyRules],
        capability: &Capability,
        header: &str,
    ) -> Result<CompileResult, CompileError> {
        let mut lowering = Lowering::new(Target::Clash);
        lowering.track(PROVIDERS);
        lowering.track(RULE_SET_REFS);
        let mut providers = ProviderMap::default();
        let mut rules = Vec::new();

        for group in policies {
            let policy = group.policy();
            // `RULE-SET,<name>,<policy>` has no escape for a comma in the policy.
            if let Err(reason) = comma_free(Target::Clash, policy) {
                for rule in group.rules() {
                    if lowering.admit(capability, rule, policy) {
                        lowering.skip(rule, policy, &reason);
                    }
                }
                continue;
            }
            let name = format!("{CLASH_PROVIDER_PREFIX}{policy}");
            if !providers.contains(&name) {
                let provider = self.provider_for(&name, policy);
                providers.0.push((name.clone(), provider));
                lowering.bump(PROVIDERS);
                rules.push(format!("RULE-SET,{name},{policy}"));
                lowering.bump(RULE_SET_REFS);
            }
            // The provider file carries the rules; here they are only vetted.
            for rule in group.rules() {
                if lowering.admit(capability, rule, policy) {
                    lowering.emit();
                }
            }
        }

        rules.push(format!("MATCH,{}", self.default_policy));
        lowering.emit();

        let doc = Document {
            rule_providers: providers,
            rules,
        };
        let mut text = String::new();
        for line in comment_lines(header) {
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str(&serde_yaml::to_string(&doc)?);
        Ok(lowering.finish(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::group;

    fn backend() -> ClashBackend {
        ClashBackend::new(
            ClashOptions {
                base_raw_url: "https://raw.example.com/o/r/main/".into(),
                ..ClashOptions::default()
            },
            "PROXY",
        )
    }

    fn compile(policies: &[PolicyRules]) -> (CompileResult, serde_yaml::Value) {
        let result = backend()
            .compile(policies, &Capability::preset(Target::Clash), "clash header")
            .unwrap();
        let doc = serde_yaml::from_str(&result.text).unwrap();
        (result, doc)
    }

    #[test]
    fn one_provider_per_policy() {
        let (result, doc) = compile(&[
            group("REJECT", &["DOMAIN-SUFFIX,ads.com", "AND,((DOMAIN,a.com),(DST-PORT,443))"]),
            group("DIRECT", &["GEOIP,CN"]),
        ]);
        assert!(result.text.starts_with("# clash header\n"));

        let provider = &doc["rule-providers"]["RL_REJECT"];
        assert_eq!(provider["type"].as_str(), Some("http"));
        assert_eq!(provider["behavior"].as_str(), Some("classical"));
        assert_eq!(
            provider["url"].as_str(),
            Some("https://raw.example.com/o/r/main/rules/REJECT.list")
        );
        assert_eq!(provider["path"].as_str(), Some("./ruleset_cache/RL_REJECT.yaml"));
        assert_eq!(provider["interval"].as_u64(), Some(86400));

        let rules: Vec<_> = doc["rules"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            rules,
            vec!["RULE-SET,RL_REJECT,REJECT", "RULE-SET,RL_DIRECT,DIRECT", "MATCH,PROXY"]
        );

        assert_eq!(result.stats.emitted(), 4);
        assert_eq!(result.stats.get(PROVIDERS), 2);
        assert_eq!(result.stats.get(RULE_SET_REFS), 2);
    }

    #[test]
    fn providers_keep_declaration_order() {
        let (result, _) = compile(&[group("ZZZ", &[]), group("AAA", &[])]);
        let zzz = result.text.find("RL_ZZZ:").unwrap();
        let aaa = result.text.find("RL_AAA:").unwrap();
        assert!(zzz < aaa);
    }

    #[test]
    fn repeated_policy_reuses_provider() {
        let (result, doc) = compile(&[
            group("PROXY", &["DOMAIN,a.com"]),
            group("PROXY", &["DOMAIN,b.com"]),
        ]);
        assert_eq!(doc["rules"].as_sequence().unwrap().len(), 2);
        assert_eq!(result.stats.get(PROVIDERS), 1);
        assert_eq!(result.stats.emitted(), 3);
    }

    #[test]
    fn user_final_still_gets_match() {
        let (result, doc) = compile(&[group("DIRECT", &["FINAL"])]);
        assert_eq!(result.stats.emitted(), 2);
        let rules = doc["rules"].as_sequence().unwrap();
        assert_eq!(rules.last().and_then(|v| v.as_str()), Some("MATCH,PROXY"));
    }

    #[test]
    fn unsupported_rule_is_warned() {
        let (result, _) = compile(&[group("PROXY", &["PROCESS-NAME,curl", "DOMAIN,a.com"])]);
        assert_eq!(result.stats.skipped(), 1);
        assert_eq!(result.stats.emitted(), 2);
        assert_eq!(result.warnings[0].fragment, "PROCESS-NAME,curl");
        assert!(result.warnings[0].reason.contains("PROCESS-NAME"));
    }

    #[test]
    fn capability_override_skips_type() {
        let cap = Capability::preset(Target::Clash).with_overrides([("SCRIPT", false)]);
        let result = backend()
            .compile(&[group("PROXY", &["SCRIPT,quic"])], &cap, "")
            .unwrap();
        assert_eq!(result.stats.skipped(), 1);
        assert!(result.warnings[0].reason.contains("SCRIPT"));
    }

    #[test]
    fn opaque_types_are_delegated() {
        let (result, doc) = compile(&[group(
            "PROXY",
            &["SCRIPT,quic", "RULE-SET,x", "DOMAIN-SET,y", "IP-ASN,13335"],
        )]);
        assert!(result.warnings.is_empty());
        assert_eq!(result.stats.skipped(), 0);
        assert_eq!(result.stats.emitted(), 5);
        assert_eq!(doc["rules"][0].as_str(), Some("RULE-SET,RL_PROXY,PROXY"));
    }

    #[test]
    fn policy_with_comma_is_skipped() {
        let (result, doc) = compile(&[
            group("A,B", &["DOMAIN,a.com", "DOMAIN,b.com"]),
            group("DIRECT", &["GEOIP,CN"]),
        ]);
        assert_eq!(result.stats.skipped(), 2);
        assert_eq!(result.stats.emitted(), 2);
        assert_eq!(result.stats.get(PROVIDERS), 1);
        assert!(doc["rule-providers"]["RL_A,B"].is_null());
        assert!(result.warnings.iter().all(|w| w.policy == "A,B"));
        assert!(result.warnings[0].reason.contains("comma"));
        assert!(!result.text.contains("RULE-SET,RL_A"));
    }

    #[test]
    fn empty_input_still_matches() {
        let result = backend()
            .compile(&[], &Capability::preset(Target::Clash), "")
            .unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&result.text).unwrap();
        assert_eq!(doc["rules"][0].as_str(), Some("MATCH,PROXY"));
        assert_eq!(result.stats.emitted(), 1);
        assert_eq!(result.stats.get(PROVIDERS), 0);
    }
}
