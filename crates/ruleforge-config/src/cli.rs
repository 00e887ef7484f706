//! CLI override definitions and application logic.

use clap::Parser;
use ruleforge_compiler::Target;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override rules directory
    #[arg(long)]
    pub rules_dir: Option<String>,
    /// Override output directory
    #[arg(long)]
    pub out_dir: Option<String>,
    /// Override target list (repeatable or comma-separated)
    #[arg(long = "target", num_args = 1.., value_delimiter = ',')]
    pub targets: Option<Vec<Target>>,
    /// Override policy of the trailing catch-all
    #[arg(long)]
    pub default_policy: Option<String>,
    /// Override raw-file root used by Clash rule-providers
    #[arg(long)]
    pub base_raw_url: Option<String>,
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.rules_dir {
        config.source.rules_dir = v.clone();
    }
    if let Some(v) = &overrides.out_dir {
        config.output.dir = v.clone();
    }
    if let Some(v) = &overrides.targets {
        config.compile.targets = v.clone();
    }
    if let Some(v) = &overrides.default_policy {
        config.compile.default_policy = v.clone();
    }
    if let Some(v) = &overrides.base_raw_url {
        config.clash.base_raw_url = Some(v.clone());
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
}
