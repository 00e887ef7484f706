//! Surge `[Rule]` section.

use ruleforge_dsl::{Atom, Logical, Rule};

use super::{Backend, Unsupported, comma_free, comment_lines};
use crate::capability::Capability;
use crate::error::CompileError;
use crate::policy::PolicyRules;
use crate::result::{CompileResult, Lowering};
use crate::target::Target;

/// Renders rules verbatim, logical combinators included.
#[derive(Debug, Clone)]
pub struct SurgeBackend {
    default_policy: String,
}

impl SurgeBackend {
    pub fn new(default_policy: impl Into<String>) -> Self {
        Self {
            default_policy: default_policy.into(),
        }
    }
}

impl Backend for SurgeBackend {
    fn target(&self) -> Target {
        Target::Surge
    }

    fn compile(
        &self,
        policies: &[PolicyRules],
        capability: &Capability,
        header: &str,
    ) -> Result<CompileResult, CompileError> {
        let mut lowering = Lowering::new(Target::Surge);
        let mut lines = comment_lines(header);
        lines.push("[Rule]".to_string());

        for group in policies {
            let policy = group.policy();
            for rule in group.rules() {
                if !lowering.admit(capability, rule, policy) {
                    continue;
                }
                match render_line(rule, policy) {
                    Ok(line) => {
                        lines.push(line);
                        lowering.emit();
                    }
                    Err(reason) => lowering.skip(rule, policy, &reason),
                }
            }
        }

        lines.push(format!("FINAL,{}", self.default_policy));
        lowering.emit();

        let mut text = lines.join("\n");
        text.push('\n');
        Ok(lowering.finish(text))
    }
}

fn render_line(rule: &Rule, policy: &str) -> Result<String, Unsupported> {
    comma_free(Target::Surge, policy)?;
    match rule {
        Rule::Atom(atom) if atom.is_final() => {
            let mut line = format!("FINAL,{policy}");
            push_options(&mut line, atom)?;
            Ok(line)
        }
        Rule::Atom(atom) => {
            comma_free(Target::Surge, atom.value())?;
            let mut line = format!("{},{},{policy}", atom.canonical_type(), atom.value());
            push_options(&mut line, atom)?;
            Ok(line)
        }
        Rule::Logical(logical) => Ok(format!("{},{policy}", render_logical(logical)?)),
    }
}

fn push_options(line: &mut String, atom: &Atom) -> Result<(), Unsupported> {
    for option in atom.options() {
        comma_free(Target::Surge, option)?;
        line.push(',');
        line.push_str(option);
    }
    Ok(())
}

/// `OP,((item),(item))`, the same shape the parser accepts.
fn render_logical(logical: &Logical) -> Result<String, Unsupported> {
    let items = logical
        .items()
        .iter()
        .map(|item| render_item(item).map(|s| format!("({s})")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("{},({})", logical.op(), items.join(",")))
}

fn render_item(rule: &Rule) -> Result<String, Unsupported> {
    match rule {
        Rule::Atom(atom) if atom.is_final() => Ok("FINAL".to_string()),
        Rule::Atom(atom) => {
            comma_free(Target::Surge, atom.value())?;
            let mut s = format!("{},{}", atom.canonical_type(), atom.value());
            push_options(&mut s, atom)?;
            Ok(s)
        }
        Rule::Logical(logical) => render_logical(logical),
    }
}
