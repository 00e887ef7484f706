//! Routing-rule DSL for ruleforge.
//!
//! One rule per line, in the classical `TYPE,VALUE[,OPTION]*` shape shared by
//! Surge and Clash rule lists, plus nested `AND` / `OR` / `NOT` expressions and
//! the `FINAL` catch-all sentinel.
//!
//! # Architecture
//!
//! - **Model**: [`Rule`] is a closed sum of [`Atom`] and [`Logical`]
//! - **Parser**: [`parse_document`] yields one [`ParsedLine`] per input line;
//!   a malformed line carries a [`GrammarError`] and never stops the rest
//!
//! # Example
//!
//! ```
//! use ruleforge_dsl::{parse_document, Rule};
//!
//! let lines = parse_document("DOMAIN-SUFFIX,example.com\n# comment\nAND,((BAD");
//! assert_eq!(lines.len(), 3);
//!
//! let rule = lines[0].rule().unwrap();
//! assert!(matches!(rule, Rule::Atom(a) if a.canonical_type() == "DOMAIN-SUFFIX"));
//! assert!(lines[1].is_blank());
//! assert!(lines[2].error().is_some());
//! ```

pub mod error;
pub mod parser;
pub mod rule;

pub use error::GrammarError;
pub use parser::{parse_document, parse_rule, split_escaped};
pub use rule::{Atom, LineOutcome, Logical, LogicalOp, ParsedLine, Rule, escape_field};
