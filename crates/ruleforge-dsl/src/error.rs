//! Grammar errors raised while parsing a single DSL line.

use thiserror::Error;

/// Why one line of DSL text could not be turned into a [`Rule`](crate::Rule).
///
/// Scoped to a single line: the parser records it on that line's
/// [`ParsedLine`](crate::ParsedLine) and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("empty rule")]
    EmptyRule,

    #[error("missing rule type: {line}")]
    EmptyRuleType { line: String },

    #[error("logical rule must be 'OP,((...))': {line}")]
    MissingPayload { line: String },

    #[error("logical payload must start with '((' and end with '))': {line}")]
    MalformedPayload { line: String },

    #[error("each logical item must be wrapped by (): {item}")]
    UnwrappedItem { item: String },

    #[error("unbalanced parentheses in logical items: {fragment}")]
    Unbalanced { fragment: String },

    #[error("NOT must contain exactly one sub-rule, found {count}")]
    NotArity { count: usize },

    #[error("{op} must contain at least one sub-rule")]
    EmptyLogical { op: &'static str },

    #[error("logical nesting deeper than {max} levels")]
    TooDeep { max: usize },
}
