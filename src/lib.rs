//! # solver-codegen
//!
//! Generates C++ constraint-solver functions from a one-line-per-equation
//! text format.
//!
//! ```text
//! distance_point_2d(x1,y1,x2,y2,d) = sqrt((x1-x2)**2 + (y1-y2)**2) - d
//! parallel(a,b,c,d) [dx = c - a, dy = d - b] = dx*dy
//! ```
//!
//! Each record becomes a `SolverFunctionsBase` subclass with its value and
//! gradient written out as C++ expressions.
//!
//! ## Modules
//!
//! - `config` - Paths, template overrides and failure policy (`codegen.toml`)
//! - `diagnostics` - Non-fatal findings such as skipped lines
//! - `dsl` - Line classification and record splitting
//! - `error` - Fatal error taxonomy
//! - `generator` - The end-to-end driver
//! - `render` - Template-based artifact rendering
//! - `resolve` - Substitution resolution
//! - `symbolic` - Expression parsing, simplification, differentiation and C++ printing
pub mod config;
pub mod diagnostics;
pub mod dsl;
pub mod error;
pub mod generator;
pub mod render;
pub mod resolve;
pub mod symbolic;

pub use config::{FailurePolicy, GeneratorConfig};
pub use diagnostics::Diagnostic;
pub use error::{GeneratorError, Result};
pub use generator::{run, GenerationReport, Generator, RunOutcome};
