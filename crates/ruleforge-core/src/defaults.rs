//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Source Defaults
// ============================================================================

/// Directory holding one rule list per policy.
pub const DEFAULT_RULES_DIR: &str = "rules";
/// File extension of a policy rule list.
pub const DEFAULT_RULES_EXTENSION: &str = "list";

// ============================================================================
// Compile Defaults
// ============================================================================

/// Policy referenced by the trailing catch-all every target appends.
pub const DEFAULT_POLICY: &str = "PROXY";
/// Deepest nesting of AND/OR/NOT accepted by the parser.
pub const MAX_LOGICAL_DEPTH: usize = 32;

// ============================================================================
// Clash Defaults
// ============================================================================

/// Prefix of generated rule-provider names (`RL_<policy>`).
pub const CLASH_PROVIDER_PREFIX: &str = "RL_";
/// Rule-provider refresh interval in seconds (1 day).
pub const DEFAULT_PROVIDER_INTERVAL_SECS: u64 = 86400;
/// Local cache directory for fetched rule-providers.
pub const DEFAULT_PROVIDER_CACHE_DIR: &str = "./ruleset_cache";

// ============================================================================
// v2ray Defaults
// ============================================================================

/// Routing domain strategy written into the v2ray document.
pub const DEFAULT_V2RAY_DOMAIN_STRATEGY: &str = "AsIs";

// ============================================================================
// Output Defaults
// ============================================================================

/// Directory the build command writes artifacts into.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";
/// Name of the machine-readable build report.
pub const REPORT_FILE_NAME: &str = "report.json";

// ============================================================================
// Logging Defaults
// ============================================================================

pub const DEFAULT_LOG_LEVEL: &str = "info";
/// One of `pretty`, `compact`, `json`.
pub const DEFAULT_LOG_FORMAT: &str = "pretty";
/// One of `stderr`, `stdout`.
pub const DEFAULT_LOG_OUTPUT: &str = "stderr";
