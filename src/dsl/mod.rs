//! Equation DSL front end
//!
//! One record per line: `name(p1, p2) [s1 = text, s2 = text] = expression`.
//! [`classify`] decides whether a line is a record at all; [`parse_record`]
//! splits an accepted line into its parts.

pub mod classifier;
pub mod record;

pub use classifier::{classify, matches_record_grammar, strip_comment, LineClass, RecordLine};
pub use record::{parse_record, EquationRecord, Substitution};
