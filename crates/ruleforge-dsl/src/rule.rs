//! Rule and parsed-line type definitions.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::GrammarError;

/// Rule type of the catch-all sentinel.
pub const FINAL: &str = "FINAL";

/// A parsed rule: a single matcher or a boolean combination of rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    Atom(Atom),
    Logical(Logical),
}

impl Rule {
    /// Every canonical rule type and operator this rule needs a target to
    /// support, at any nesting depth.
    pub fn required_capabilities(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        self.collect_required(&mut keys);
        keys
    }

    fn collect_required(&self, keys: &mut BTreeSet<String>) {
        match self {
            Rule::Atom(atom) => {
                keys.insert(atom.canonical_type());
            }
            Rule::Logical(logical) => {
                keys.insert(logical.op().as_str().to_string());
                for item in logical.items() {
                    item.collect_required(keys);
                }
            }
        }
    }

    /// Whether this is the `FINAL` sentinel atom.
    pub fn is_final(&self) -> bool {
        matches!(self, Rule::Atom(atom) if atom.is_final())
    }
}

impl From<Atom> for Rule {
    fn from(atom: Atom) -> Self {
        Rule::Atom(atom)
    }
}

impl From<Logical> for Rule {
    fn from(logical: Logical) -> Self {
        Rule::Logical(logical)
    }
}

/// Renders the rule back into DSL text that [`parse_rule`](crate::parse_rule)
/// accepts. Literal commas inside fields are written as `\,`.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Atom(atom) => atom.fmt(f),
            Rule::Logical(logical) => logical.fmt(f),
        }
    }
}

/// A leaf matcher: `TYPE[,VALUE[,OPTION]*]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    rule_type: String,
    value: String,
    options: Vec<String>,
}

impl Atom {
    pub fn new(
        rule_type: impl Into<String>,
        value: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            rule_type: rule_type.into(),
            value: value.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// The `FINAL` sentinel with no value and no options.
    pub fn final_rule() -> Self {
        Self {
            rule_type: FINAL.to_string(),
            value: String::new(),
            options: Vec::new(),
        }
    }

    /// Rule type as written in the source.
    pub fn rule_type(&self) -> &str {
        &self.rule_type
    }

    /// Trimmed, upper-cased rule type.
    pub fn canonical_type(&self) -> String {
        self.rule_type.trim().to_uppercase()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn is_final(&self) -> bool {
        self.canonical_type() == FINAL
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape_field(&self.canonical_type()))?;
        if self.value.is_empty() && self.options.is_empty() {
            return Ok(());
        }
        write!(f, ",{}", escape_field(&self.value))?;
        for option in &self.options {
            write!(f, ",{}", escape_field(option))?;
        }
        Ok(())
    }
}

/// Boolean operator of a [`Logical`] rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    /// Recognise an operator keyword, ignoring case and surrounding whitespace.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            _ => None,
        }
    }

    /// Canonical upper-case keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `OP,((ITEM)[,(ITEM)]*)`.
///
/// `NOT` always holds exactly one item, `AND` / `OR` at least one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Logical {
    op: LogicalOp,
    items: Vec<Rule>,
}

impl Logical {
    pub fn new(op: LogicalOp, items: Vec<Rule>) -> Result<Self, GrammarError> {
        match (op, items.len()) {
            (LogicalOp::Not, 1) => {}
            (LogicalOp::Not, count) => return Err(GrammarError::NotArity { count }),
            (_, 0) => return Err(GrammarError::EmptyLogical { op: op.as_str() }),
            _ => {}
        }
        Ok(Self { op, items })
    }

    pub fn op(&self) -> LogicalOp {
        self.op
    }

    pub fn items(&self) -> &[Rule] {
        &self.items
    }
}

impl fmt::Display for Logical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},(", self.op)?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "({item})")?;
        }
        f.write_str(")")
    }
}

/// Escape literal commas so the field survives [`split_escaped`](crate::split_escaped).
pub fn escape_field(field: &str) -> String {
    field.replace(',', "\\,")
}

/// Outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Empty line or comment.
    Blank,
    Rule(Rule),
    Error(GrammarError),
}

/// One input line and what the parser made of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    raw: String,
    outcome: LineOutcome,
}

impl ParsedLine {
    pub fn new(raw: impl Into<String>, outcome: LineOutcome) -> Self {
        Self {
            raw: raw.into(),
            outcome,
        }
    }

    /// The line exactly as it appeared, without its terminator.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn outcome(&self) -> &LineOutcome {
        &self.outcome
    }

    pub fn rule(&self) -> Option<&Rule> {
        match &self.outcome {
            LineOutcome::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GrammarError> {
        match &self.outcome {
            LineOutcome::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.outcome, LineOutcome::Blank)
    }

    pub fn into_rule(self) -> Option<Rule> {
        match self.outcome {
            LineOutcome::Rule(rule) => Some(rule),
            _ => None,
        }
    }
}
