//! Equation record parsing
//!
//! Splits a line that already matched the record grammar into its name,
//! parameters, substitutions and raw expression text. Because the grammar
//! was checked first, any split that fails here is a structural error and is
//! reported loudly instead of skipping the line.

use std::collections::HashSet;

use crate::error::{GeneratorError, Result};

use super::classifier::RecordLine;

/// A named placeholder and the raw text it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub name: String,
    pub text: String,
}

/// One parsed, unresolved equation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationRecord {
    pub line_number: usize,
    pub name: String,
    pub parameters: Vec<String>,
    /// In declaration order, left to right.
    pub substitutions: Vec<Substitution>,
    pub expression_text: String,
}

impl EquationRecord {
    /// `name(p1, p2, ...)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.parameters.join(", "))
    }
}

/// Parse a grammar-checked line into an [`EquationRecord`].
pub fn parse_record(line: &RecordLine) -> Result<EquationRecord> {
    let structural = |reason: String| GeneratorError::Structural {
        line_number: line.line_number,
        line: line.text.clone(),
        reason,
    };

    let (remaining, block) = extract_substitution_block(&line.text).map_err(structural)?;

    let (lhs, rhs) = remaining
        .split_once('=')
        .ok_or_else(|| structural("missing `=` before the expression".to_string()))?;
    let (name, params) = lhs
        .split_once('(')
        .ok_or_else(|| structural("missing `(` after the function name".to_string()))?;

    let name = name.trim();
    check_identifier(name, "function name").map_err(structural)?;

    let params = params
        .trim()
        .strip_suffix(')')
        .ok_or_else(|| structural("missing `)` closing the parameter list".to_string()))?;
    let parameters = params
        .split(',')
        .map(|param| {
            let param = param.trim();
            check_identifier(param, "parameter").map(|_| param.to_string())
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(structural)?;
    if let Some(duplicate) = first_duplicate(&parameters) {
        return Err(structural(format!("duplicate parameter `{duplicate}`")));
    }

    let expression_text = rhs.trim();
    if expression_text.is_empty() {
        return Err(structural("empty expression".to_string()));
    }

    let substitutions = match block {
        Some(block) => parse_substitutions(&block).map_err(structural)?,
        None => Vec::new(),
    };

    Ok(EquationRecord {
        line_number: line.line_number,
        name: name.to_string(),
        parameters,
        substitutions,
        expression_text: expression_text.to_string(),
    })
}

/// Cut the first `[...]` span between the parameter list and the defining
/// `=` out of `text`, returning the remaining text and the span's contents.
fn extract_substitution_block(text: &str) -> std::result::Result<(String, Option<String>), String> {
    let Some(params_end) = text.find(')') else {
        return Ok((text.to_string(), None));
    };
    let (head, tail) = text.split_at(params_end + 1);

    let Some(open) = tail.find('[') else {
        return Ok((text.to_string(), None));
    };
    if tail.find('=').is_some_and(|equals| equals < open) {
        // The bracket belongs to the expression.
        return Ok((text.to_string(), None));
    }

    let close = tail[open..]
        .find(']')
        .map(|offset| open + offset)
        .ok_or_else(|| "unterminated `[` in the substitution block".to_string())?;
    let contents = &tail[open + 1..close];
    if contents.contains('[') {
        return Err("nested `[` inside the substitution block".to_string());
    }

    let remaining = format!("{head}{}{}", &tail[..open], &tail[close + 1..]);
    Ok((remaining, Some(contents.to_string())))
}

fn parse_substitutions(block: &str) -> std::result::Result<Vec<Substitution>, String> {
    block
        .split(',')
        .map(|entry| {
            let (name, text) = entry
                .split_once('=')
                .ok_or_else(|| format!("substitution `{}` has no `=`", entry.trim()))?;
            let name = name.trim();
            check_identifier(name, "substitution name")?;
            let text = text.trim();
            if text.is_empty() {
                return Err(format!("substitution `{name}` has an empty value"));
            }
            Ok(Substitution {
                name: name.to_string(),
                text: text.to_string(),
            })
        })
        .collect()
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}

fn check_identifier(candidate: &str, what: &str) -> std::result::Result<(), String> {
    let valid = !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(format!("invalid {what} `{candidate}`"))
    }
}
