//! # ruleforge
//!
//! Compiles a small routing-rule DSL into the native rule syntaxes of
//! several proxy clients.
//!
//! ## Crates
//!
//! - [`ruleforge_core`] - Default constants and project metadata
//! - [`ruleforge_dsl`] - Rule model and line parser
//! - [`ruleforge_compiler`] - Capabilities and the five target backends
//! - [`ruleforge_config`] - Configuration loading and validation
//! - [`ruleforge_build`] - Rule-list loading, concurrent compilation, artifact output

pub use ruleforge_build as build;
pub use ruleforge_compiler as compiler;
pub use ruleforge_config as config;
pub use ruleforge_core as core;
pub use ruleforge_dsl as dsl;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use ruleforge_build::{BuildError, BuildOutcome, build, check};
    pub use ruleforge_compiler::{
        Backend, Capability, CompileOptions, CompileResult, PolicyRules, Target, backend_for,
    };
    pub use ruleforge_config::{Config, load_config, validate_config};
    pub use ruleforge_dsl::{ParsedLine, Rule, parse_document, parse_rule};
}
