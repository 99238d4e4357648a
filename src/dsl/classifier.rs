//! Line classification
//!
//! Each physical line is comment-stripped and either discarded (blank),
//! accepted as an equation record, or reported as skipped. Classification
//! never fails: a malformed line becomes a [`Diagnostic`], not an error.

use pest::Parser;
use pest_derive::Parser;

use crate::diagnostics::Diagnostic;

#[derive(Parser)]
#[grammar = "dsl/record.pest"]
struct RecordGrammar;

/// A comment-stripped line that matched the record grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLine {
    pub line_number: usize,
    pub text: String,
}

/// Outcome of classifying one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    Record(RecordLine),
    Skipped(Diagnostic),
}

/// Remove everything from the first unescaped `#` to the end of the line.
///
/// `\#` is kept as a literal `#`.
pub fn strip_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'#') => {
                out.push('#');
                chars.next();
            }
            '#' => break,
            other => out.push(other),
        }
    }
    out
}

/// True when `text` has the shape `name(params) [subs] = expression`.
pub fn matches_record_grammar(text: &str) -> bool {
    RecordGrammar::parse(Rule::record, text).is_ok()
}

/// Classify one physical line. `line_number` is 1-based.
pub fn classify(line_number: usize, raw: &str) -> LineClass {
    let stripped = strip_comment(raw);
    let text = stripped.trim();
    if text.is_empty() {
        return LineClass::Blank;
    }

    if matches_record_grammar(text) {
        LineClass::Record(RecordLine {
            line_number,
            text: text.to_string(),
        })
    } else {
        LineClass::Skipped(Diagnostic::SkippedLine {
            line_number,
            text: text.to_string(),
        })
    }
}
