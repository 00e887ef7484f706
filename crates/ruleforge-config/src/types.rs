//! Configuration type definitions for sources, output, compilation targets, and logging.

use std::collections::{BTreeMap, HashMap};

use ruleforge_compiler::Target;
use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub compile: CompileConfig,
    #[serde(default)]
    pub clash: ClashConfig,
    #[serde(default)]
    pub v2ray: V2RayConfig,
    /// Per-target capability overrides merged over the built-in preset,
    /// e.g. `[capabilities.surge] "USER-AGENT" = false`.
    #[serde(default)]
    pub capabilities: BTreeMap<String, BTreeMap<String, bool>>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding one `<POLICY>.<extension>` file per policy.
    #[serde(default = "default_rules_dir")]
    pub rules_dir: String,
    #[serde(default = "default_rules_extension")]
    pub extension: String,
    /// Policies compiled first, in this order; the rest follow alphabetically.
    #[serde(default)]
    pub policy_order: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            rules_dir: default_rules_dir(),
            extension: default_rules_extension(),
            policy_order: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    /// Header written as a comment into every artifact. A generated one is
    /// used when unset.
    #[serde(default)]
    pub header: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            header: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Policy of the catch-all every target appends.
    #[serde(default = "default_policy")]
    pub default_policy: String,
    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            default_policy: default_policy(),
            targets: default_targets(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClashConfig {
    /// Raw-file root the generated rule-providers fetch from.
    #[serde(default)]
    pub base_raw_url: Option<String>,
    /// Provider refresh interval in seconds.
    #[serde(default = "default_provider_interval")]
    pub interval: u64,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

impl Default for ClashConfig {
    fn default() -> Self {
        Self {
            base_raw_url: None,
            interval: default_provider_interval(),
            cache_dir: default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2RayConfig {
    #[serde(default = "default_domain_strategy")]
    pub domain_strategy: String,
}

impl Default for V2RayConfig {
    fn default() -> Self {
        Self {
            domain_strategy: default_domain_strategy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"ruleforge_compiler": "debug"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
