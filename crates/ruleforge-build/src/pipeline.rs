//! Parsing, grouping and concurrent compilation.

use std::path::PathBuf;
use std::sync::Arc;

use ruleforge_compiler::{
    Capability, ClashOptions, CompileOptions, CompileResult, PolicyRules, Target, backend_for,
};
use ruleforge_config::Config;
use ruleforge_core::VERSION;
use ruleforge_dsl::parse_document;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::BuildError;
use crate::source::PolicySource;

/// A grammar error located in its rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: PathBuf,
    /// 1-based.
    pub line: usize,
    pub raw: String,
    pub error: String,
}

/// Rules grouped by policy plus every grammar error met on the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedSources {
    pub policies: Vec<PolicyRules>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedSources {
    pub fn rule_count(&self) -> usize {
        ruleforge_compiler::rule_count(&self.policies)
    }
}

/// Parse each source and group its rules under the source's policy, keeping
/// file and line order.
pub fn parse_sources(sources: &[PolicySource]) -> ParsedSources {
    let mut parsed = ParsedSources::default();
    for source in sources {
        let mut rules = Vec::new();
        for (idx, line) in parse_document(&source.text).into_iter().enumerate() {
            if let Some(err) = line.error() {
                warn!(
                    file = %source.path.display(),
                    line = idx + 1,
                    error = %err,
                    "grammar error"
                );
                parsed.diagnostics.push(Diagnostic {
                    file: source.path.clone(),
                    line: idx + 1,
                    raw: line.raw().to_string(),
                    error: err.to_string(),
                });
            } else if let Some(rule) = line.into_rule() {
                rules.push(rule);
            }
        }
        debug!(policy = %source.policy, rules = rules.len(), "policy parsed");
        parsed.policies.push(PolicyRules::new(&source.policy, rules));
    }
    parsed
}

/// Everything the backends need, resolved from configuration.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub targets: Vec<(Target, Capability)>,
    pub options: CompileOptions,
    pub header: String,
}

impl BuildPlan {
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let mut targets: Vec<(Target, Capability)> = config
            .compile
            .targets
            .iter()
            .map(|&target| (target, Capability::preset(target)))
            .collect();
        for (name, overrides) in &config.capabilities {
            let target: Target = name.parse()?;
            for (t, capability) in targets.iter_mut() {
                if *t == target {
                    *capability = capability
                        .clone()
                        .with_overrides(overrides.iter().map(|(k, v)| (k, *v)));
                }
            }
        }

        let options = CompileOptions {
            default_policy: config.compile.default_policy.trim().to_string(),
            clash: ClashOptions {
                base_raw_url: config.clash.base_raw_url.clone().unwrap_or_default(),
                interval: config.clash.interval,
                cache_dir: config.clash.cache_dir.clone(),
            },
            v2ray_domain_strategy: config.v2ray.domain_strategy.clone(),
        };

        let header = config
            .output
            .header
            .clone()
            .unwrap_or_else(default_header);

        Ok(Self {
            targets,
            options,
            header,
        })
    }
}

/// Header used when the config does not set one. Deterministic so that
/// unchanged rule lists produce byte-identical artifacts.
pub fn default_header() -> String {
    format!("Generated by ruleforge {VERSION}. Do not edit; change the rule lists instead.")
}

/// Run every planned backend on its own blocking task and return the results
/// in plan order.
pub async fn compile_targets(
    plan: &BuildPlan,
    policies: Arc<Vec<PolicyRules>>,
) -> Result<Vec<(Target, CompileResult)>, BuildError> {
    let header: Arc<str> = Arc::from(plan.header.as_str());

    let handles: Vec<_> = plan
        .targets
        .iter()
        .map(|(target, capability)| {
            let target = *target;
            let backend = backend_for(target, &plan.options);
            let capability = capability.clone();
            let policies = Arc::clone(&policies);
            let header = Arc::clone(&header);
            let handle = tokio::task::spawn_blocking(move || {
                backend.compile(&policies, &capability, &header)
            });
            (target, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (target, handle) in handles {
        let result = handle
            .await?
            .map_err(|source| BuildError::Compile { target, source })?;
        debug!(
            target_name = %target,
            emitted = result.stats.emitted(),
            skipped = result.stats.skipped(),
            "target compiled"
        );
        results.push((target, result));
    }
    Ok(results)
}
