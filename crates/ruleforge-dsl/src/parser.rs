//! Line parser for the rule DSL.

use ruleforge_core::MAX_LOGICAL_DEPTH;

use crate::error::GrammarError;
use crate::rule::{Atom, LineOutcome, Logical, LogicalOp, ParsedLine, Rule};

/// Parse a rule document into one [`ParsedLine`] per input line.
///
/// Lines that are empty after trimming, or whose first non-whitespace
/// character is `#` or `;`, are blank. A malformed line records its
/// [`GrammarError`] and parsing continues with the next line.
pub fn parse_document(text: &str) -> Vec<ParsedLine> {
    text.lines()
        .map(|raw| {
            let line = raw.trim();
            let outcome = if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                LineOutcome::Blank
            } else {
                match parse_rule(line) {
                    Ok(rule) => LineOutcome::Rule(rule),
                    Err(err) => LineOutcome::Error(err),
                }
            };
            ParsedLine::new(raw, outcome)
        })
        .collect()
}

/// Parse a single rule line (e.g. `DOMAIN-SUFFIX,apple.com` or
/// `AND,((DOMAIN,a.com),(DST-PORT,443))`).
pub fn parse_rule(line: &str) -> Result<Rule, GrammarError> {
    parse_rule_at(line, 0)
}

fn parse_rule_at(line: &str, depth: usize) -> Result<Rule, GrammarError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(GrammarError::EmptyRule);
    }
    if line.eq_ignore_ascii_case("FINAL") {
        return Ok(Rule::Atom(Atom::final_rule()));
    }

    let head = split_escaped(line, Some(1)).swap_remove(0);
    if let Some(op) = LogicalOp::from_keyword(&head) {
        return parse_logical(line, op, depth);
    }

    let mut fields = split_escaped(line, None).into_iter().map(|f| f.trim().to_string());
    let rule_type = fields.next().unwrap_or_default();
    if rule_type.is_empty() {
        return Err(GrammarError::EmptyRuleType {
            line: line.to_string(),
        });
    }
    let value = fields.next().unwrap_or_default();
    Ok(Rule::Atom(Atom::new(rule_type, value, fields)))
}

/// `OP,((ITEM)[,(ITEM)]*)` where every ITEM is a full rule line.
fn parse_logical(line: &str, op: LogicalOp, depth: usize) -> Result<Rule, GrammarError> {
    if depth >= MAX_LOGICAL_DEPTH {
        return Err(GrammarError::TooDeep {
            max: MAX_LOGICAL_DEPTH,
        });
    }

    let parts = split_escaped(line, Some(1));
    let [_, payload] = parts.as_slice() else {
        return Err(GrammarError::MissingPayload {
            line: line.to_string(),
        });
    };

    let payload = payload.trim();
    if !(payload.starts_with("((") && payload.ends_with("))")) {
        return Err(GrammarError::MalformedPayload {
            line: line.to_string(),
        });
    }
    // The outer pair encloses the item list; every item carries its own pair.
    let inner = &payload[1..payload.len() - 1];

    let mut items = Vec::new();
    for item in split_top_level_items(inner)? {
        let body = unwrap_item(item).ok_or_else(|| GrammarError::UnwrappedItem {
            item: item.to_string(),
        })?;
        items.push(parse_rule_at(body, depth + 1)?);
    }

    Logical::new(op, items).map(Rule::Logical)
}

fn unwrap_item(item: &str) -> Option<&str> {
    item.strip_prefix('(')?.strip_suffix(')')
}

/// Split a logical payload into its top-level items, honouring nested
/// parentheses. Empty items are dropped.
fn split_top_level_items(payload: &str) -> Result<Vec<&str>, GrammarError> {
    let unbalanced = || GrammarError::Unbalanced {
        fragment: payload.to_string(),
    };

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in payload.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            ',' if depth == 0 => {
                items.push(payload[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    items.push(payload[start..].trim());
    items.retain(|item| !item.is_empty());
    Ok(items)
}

/// Split on commas, treating `\,` as a literal comma.
///
/// With `max_split = Some(n)`, at most `n` separators are honoured and the
/// remainder is returned verbatim, escapes included, so a nested rule keeps
/// its own escaping for the recursive parse.
pub fn split_escaped(s: &str, max_split: Option<usize>) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = s.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if max_split.is_some_and(|max| fields.len() >= max) {
            current.push_str(&s[idx..]);
            break;
        }
        match c {
            '\\' if matches!(chars.peek(), Some((_, ','))) => {
                chars.next();
                current.push(',');
            }
            ',' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
