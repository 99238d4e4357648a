//! Symbolic expression engine
//!
//! A small computer-algebra core sized for constraint functions:
//! - Parsing against a symbol vocabulary (`parse`)
//! - Substitution of a symbol by another expression (`Expr::substitute`)
//! - Partial derivatives and gradients (`Expr::derivative`, `Expr::gradient`)
//! - Numeric evaluation (`Expr::evaluate`)
//! - C++ serialization (`Expr::to_cpp`) and re-parseable `Display`
//!
//! Trees are kept in a light normal form by the constructors in `simplify`;
//! there is no general simplifier.

pub mod ast;
pub mod calculus;
pub mod evaluator;
pub mod parser;
pub mod printer;
pub mod simplify;

use thiserror::Error;

pub use ast::{Constant, Expr, Function};
pub use parser::{parse, Vocabulary};

/// Errors raised by the symbolic engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("invalid number literal `{0}`")]
    InvalidNumber(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{0}` is a symbol and cannot be called")]
    NotCallable(String),

    #[error("function `{function}` takes {expected} argument(s), found {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("symbol `{0}` has no value")]
    UnboundSymbol(String),

    #[error("expression contains the non-finite value `{0}`")]
    NonFinite(f64),
}

impl Expr {
    /// Replace every occurrence of the free symbol `name` with `replacement`.
    pub fn substitute(&self, name: &str, replacement: &Expr) -> Expr {
        if !self.contains_symbol(name) {
            return self.clone();
        }
        match self {
            Expr::Symbol(symbol) if symbol == name => replacement.clone(),
            Expr::Number(_) | Expr::Symbol(_) | Expr::Constant(_) => self.clone(),
            Expr::Sum(terms) => Expr::add(terms.iter().map(|t| t.substitute(name, replacement))),
            Expr::Product(factors) => {
                Expr::mul(factors.iter().map(|f| f.substitute(name, replacement)))
            }
            Expr::Power(base, exponent) => Expr::pow(
                base.substitute(name, replacement),
                exponent.substitute(name, replacement),
            ),
            Expr::Call(function, args) => Expr::call(
                *function,
                args.iter()
                    .map(|arg| arg.substitute(name, replacement))
                    .collect(),
            ),
        }
    }
}
