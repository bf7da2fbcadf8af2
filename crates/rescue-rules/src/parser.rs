// File: rescue-rules/src/parser.rs
// Purpose: Parse per-field rule specs into clause lists
//
// Grammar:
//   spec       := "" | "-" | clause ("," clause)*
//   clause     := name ["(" param ("|" param)* ")"] ["~" message]
//
// Parsing is pure: same spec string, same clauses. Unknown predicate names
// are accepted here and resolved against a registry later.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};

/// One predicate invocation as declared on a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleClause {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleClause {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            message: None,
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for RuleClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params.join("|"))?;
        }
        if let Some(message) = &self.message {
            write!(f, "~{}", message)?;
        }
        Ok(())
    }
}

/// An ordered clause list, as parsed from one field's rule spec
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSpec(Vec<RuleClause>);

impl RuleSpec {
    pub fn new(clauses: Vec<RuleClause>) -> Self {
        Self(clauses)
    }

    pub fn into_clauses(self) -> Vec<RuleClause> {
        self.0
    }
}

impl Deref for RuleSpec {
    type Target = [RuleClause];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for RuleSpec {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).map(RuleSpec)
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// Parse a rule spec into its clauses, in declared order
///
/// # Examples
///
/// ```
/// use rescue_rules::parser::parse;
///
/// let clauses = parse("int,range(1|3),required~Level must be only (1-3)").unwrap();
/// assert_eq!(clauses.len(), 3);
/// assert_eq!(clauses[1].params, vec!["1", "3"]);
/// assert_eq!(clauses[2].message.as_deref(), Some("Level must be only (1-3)"));
/// ```
pub fn parse(spec: &str) -> EngineResult<Vec<RuleClause>> {
    let trimmed = spec.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(Vec::new());
    }

    let mut clauses = Vec::new();
    let mut rest = trimmed;

    loop {
        let (clause, remaining) = parse_clause(spec, rest)?;
        clauses.push(clause);

        match remaining.strip_prefix(',') {
            Some(next) if next.trim().is_empty() => {
                return Err(EngineError::malformed(spec, "trailing ','"));
            }
            Some(next) => rest = next,
            None => break,
        }
    }

    Ok(clauses)
}

/// Parse one clause from the front of `input`
///
/// Returns the clause and what follows it, which is either empty or starts
/// with the `,` separating it from the next clause.
fn parse_clause<'a>(spec: &str, input: &'a str) -> EngineResult<(RuleClause, &'a str)> {
    let input = input.trim_start();

    let name_len = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(input.len());
    if name_len == 0 {
        let reason = match input.chars().next() {
            Some(',') | None => "empty clause".to_string(),
            Some(c) => format!("expected predicate name, found '{}'", c),
        };
        return Err(EngineError::malformed(spec, reason));
    }

    let mut clause = RuleClause::new(&input[..name_len]);
    let mut rest = input[name_len..].trim_start();

    if let Some(after_open) = rest.strip_prefix('(') {
        let (params, after_close) = parse_params(spec, after_open)?;
        clause.params = params;
        rest = after_close.trim_start();
    }

    if let Some(after_tilde) = rest.strip_prefix('~') {
        let end = after_tilde.find(',').unwrap_or(after_tilde.len());
        let message = after_tilde[..end].trim();
        if message.is_empty() {
            return Err(EngineError::malformed(
                spec,
                format!("empty message for '{}'", clause.name),
            ));
        }
        clause.message = Some(message.to_string());
        rest = &after_tilde[end..];
    }

    match rest.chars().next() {
        None | Some(',') => Ok((clause, rest)),
        Some(c) => Err(EngineError::malformed(
            spec,
            format!("unexpected '{}' after '{}'", c, clause.name),
        )),
    }
}

/// Scan a parameter list up to its closing parenthesis
///
/// `|` separates parameters only at the list's own nesting level and outside
/// bracket classes; escaped characters are kept verbatim.
fn parse_params<'a>(spec: &str, input: &'a str) -> EngineResult<(Vec<String>, &'a str)> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut depth = 1usize;
    let mut in_class = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }

        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '[' if !in_class => {
                in_class = true;
                current.push(c);
            }
            ']' if in_class => {
                in_class = false;
                current.push(c);
            }
            _ if in_class => current.push(c),
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    if !(params.is_empty() && current.is_empty()) {
                        params.push(current);
                    }
                    return Ok((params, &input[i + c.len_utf8()..]));
                }
                current.push(c);
            }
            '|' if depth == 1 => params.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    Err(EngineError::malformed(spec, "unbalanced parentheses"))
}
