use std::path::PathBuf;

use thiserror::Error;

use crate::symbolic::ExprError;

/// Fatal errors of a generation run.
///
/// Malformed lines that fail the record grammar are not errors: they are
/// reported as [`crate::diagnostics::Diagnostic`] values and the run continues.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("line {line_number}: malformed equation record `{line}`: {reason}")]
    Structural {
        line_number: usize,
        line: String,
        reason: String,
    },

    #[error("function `{function}`: cannot compile expression `{text}`: {source}")]
    ExpressionCompile {
        function: String,
        text: String,
        #[source]
        source: ExprError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl GeneratorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors confined to a single equation record.
    ///
    /// These are the errors a best-effort run may downgrade to diagnostics.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            GeneratorError::Structural { .. } | GeneratorError::ExpressionCompile { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
