//! Build pipeline for ruleforge.
//!
//! Loads one rule list per policy from a directory, parses and groups the
//! rules, compiles every configured target concurrently, and writes the
//! artifacts plus a `report.json`.
//!
//! # Architecture
//!
//! - **Sources**: [`load_policy_sources`] reads `<POLICY>.<ext>` files
//! - **Pipeline**: [`parse_sources`] and [`compile_targets`]
//! - **Writer**: [`write_artifacts`] and [`BuildReport`]
//! - **CLI**: `build` and `check` commands

pub mod cli;
pub mod error;
mod logging;
pub mod pipeline;
pub mod source;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ruleforge_config::Config;

pub use cli::{BuildArgs, CheckArgs, run_build, run_check};
pub use error::BuildError;
pub use logging::init_tracing;
pub use pipeline::{
    BuildPlan, Diagnostic, ParsedSources, compile_targets, default_header, parse_sources,
};
pub use source::{PolicySource, load_policy_sources};
pub use writer::{BuildReport, TargetReport, write_artifacts};

/// What a build produced.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub report: BuildReport,
    /// Artifact paths in target order, report last.
    pub written: Vec<PathBuf>,
}

/// What a check found.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub policies: usize,
    pub rules: usize,
    pub diagnostics: Vec<Diagnostic>,
}

fn load_and_parse(config: &Config) -> Result<ParsedSources, BuildError> {
    let sources = load_policy_sources(
        Path::new(&config.source.rules_dir),
        &config.source.extension,
        &config.source.policy_order,
    )?;
    Ok(parse_sources(&sources))
}

/// Run the full pipeline for an already validated config.
pub async fn build(config: &Config) -> Result<BuildOutcome, BuildError> {
    let plan = BuildPlan::from_config(config)?;
    let parsed = load_and_parse(config)?;
    let rules = parsed.rule_count();
    let policy_names = parsed
        .policies
        .iter()
        .map(|p| p.policy().to_string())
        .collect();

    let results = compile_targets(&plan, Arc::new(parsed.policies)).await?;
    let report = BuildReport::new(policy_names, rules, parsed.diagnostics, &results);
    let written = write_artifacts(Path::new(&config.output.dir), &results, &report)?;
    Ok(BuildOutcome { report, written })
}

/// Parse every rule list without compiling.
pub fn check(config: &Config) -> Result<CheckOutcome, BuildError> {
    let parsed = load_and_parse(config)?;
    Ok(CheckOutcome {
        policies: parsed.policies.len(),
        rules: parsed.rule_count(),
        diagnostics: parsed.diagnostics,
    })
}
