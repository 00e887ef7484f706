//! Capability-aware lowering of parsed rules into proxy client formats.
//!
//! Each [`Backend`] takes rules grouped by policy, a [`Capability`] set and a
//! header, and returns a [`CompileResult`]. Rules a target cannot express are
//! dropped with a [`CompileWarning`]; compilation itself only fails when the
//! finished document cannot be serialized.
//!
//! ```
//! use ruleforge_compiler::{Capability, CompileOptions, PolicyRules, Target, backend_for};
//! use ruleforge_dsl::parse_rule;
//!
//! let rules = vec![parse_rule("DOMAIN-SUFFIX,example.com").unwrap()];
//! let policies = [PolicyRules::new("PROXY", rules)];
//! let backend = backend_for(Target::Surge, &CompileOptions::default());
//! let result = backend
//!     .compile(&policies, &Capability::preset(Target::Surge), "")
//!     .unwrap();
//! assert_eq!(result.text, "[Rule]\nDOMAIN-SUFFIX,example.com,PROXY\nFINAL,PROXY\n");
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod policy;
mod port;
pub mod result;
pub mod target;

pub use backend::{Backend, ClashOptions, CompileOptions, Unsupported, backend_for};
pub use capability::{Capability, rule_is_fully_supported};
pub use error::CompileError;
pub use policy::{PolicyRules, normalize_policy, rule_count};
pub use result::{CompileResult, CompileStats, CompileWarning};
pub use target::{Target, UnknownTarget};
