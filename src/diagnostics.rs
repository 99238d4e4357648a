//! Non-fatal findings collected during a run

use std::fmt;

/// A recoverable problem with one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A non-blank line that does not match the record grammar.
    SkippedLine { line_number: usize, text: String },
    /// A record dropped by a best-effort run after a record-level error.
    RejectedRecord { line_number: usize, reason: String },
}

impl Diagnostic {
    pub fn line_number(&self) -> usize {
        match self {
            Diagnostic::SkippedLine { line_number, .. }
            | Diagnostic::RejectedRecord { line_number, .. } => *line_number,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SkippedLine { line_number, text } => {
                write!(f, "line {line_number}: the following line was ignored: {text}")
            }
            Diagnostic::RejectedRecord {
                line_number,
                reason,
            } => write!(f, "line {line_number}: record rejected: {reason}"),
        }
    }
}
