//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `ruleforge_core::defaults`.

use ruleforge_compiler::Target;
use ruleforge_core::defaults;

/// Generate default value functions that forward to ruleforge_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_provider_interval => DEFAULT_PROVIDER_INTERVAL_SECS: u64,
}

default_string_fns! {
    default_rules_dir       => DEFAULT_RULES_DIR,
    default_rules_extension => DEFAULT_RULES_EXTENSION,
    default_output_dir      => DEFAULT_OUTPUT_DIR,
    default_policy          => DEFAULT_POLICY,
    default_cache_dir       => DEFAULT_PROVIDER_CACHE_DIR,
    default_domain_strategy => DEFAULT_V2RAY_DOMAIN_STRATEGY,
}

pub(crate) fn default_targets() -> Vec<Target> {
    Target::ALL.to_vec()
}
