//! CLI module for ruleforge-build.
//!
//! Provides the `build` and `check` commands, used as subcommands of the
//! main ruleforge CLI.

use std::path::PathBuf;

use clap::Parser;
use ruleforge_config::{CliOverrides, Config, apply_overrides, load_config, validate_config};
use tracing::{info, warn};

use crate::error::BuildError;
use crate::logging::init_tracing;
use crate::{build, check};

/// Compile every rule list into all configured targets.
#[derive(Parser, Debug, Clone)]
#[command(name = "ruleforge-build", version, about = "Compile rule lists into client rule sets")]
pub struct BuildArgs {
    /// Config file path (toml/json/jsonc/yaml). Built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

/// Parse every rule list and report grammar errors without writing anything.
#[derive(Parser, Debug, Clone)]
#[command(name = "ruleforge-check", version, about = "Check rule lists for grammar errors")]
pub struct CheckArgs {
    /// Config file path (toml/json/jsonc/yaml). Built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

fn resolve_config(
    path: Option<&PathBuf>,
    overrides: &CliOverrides,
) -> Result<Config, BuildError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, overrides);
    Ok(config)
}

/// Run the build command. Grammar errors and dropped rules are reported, not fatal.
pub async fn run_build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args.config.as_ref(), &args.overrides)?;
    validate_config(&config)?;

    init_tracing(&config.logging);

    let outcome = build(&config).await?;
    let report = &outcome.report;
    if !report.diagnostics.is_empty() {
        warn!(
            count = report.diagnostics.len(),
            "rule lists contain grammar errors; those lines were ignored"
        );
    }
    if report.warning_count() > 0 {
        warn!(
            count = report.warning_count(),
            "some rules could not be expressed by every target; see the report"
        );
    }
    info!(
        policies = report.policies.len(),
        rules = report.rules,
        artifacts = outcome.written.len(),
        out_dir = %config.output.dir,
        "build finished"
    );
    Ok(())
}

/// Run the check command. Fails when any rule list has a grammar error.
pub fn run_check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args.config.as_ref(), &args.overrides)?;

    init_tracing(&config.logging);

    let outcome = check(&config)?;
    if !outcome.diagnostics.is_empty() {
        return Err(BuildError::Grammar {
            count: outcome.diagnostics.len(),
        }
        .into());
    }
    info!(
        policies = outcome.policies,
        rules = outcome.rules,
        "rule lists are valid"
    );
    Ok(())
}
