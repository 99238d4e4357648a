//! Expression tree types for the symbolic engine
//!
//! These types are data-only. Construction with simplification lives in
//! `simplify`, and every transformation goes through those constructors so a
//! tree built by this crate is always in the same normal form.

use std::collections::BTreeSet;
use std::fmt;

/// A symbolic scalar expression.
///
/// Subtraction is stored as a sum with a `-1` coefficient and division as a
/// product with a `-1` power, the same normal form used by computer algebra
/// systems, so substitution and differentiation only deal with four shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(String),
    Constant(Constant),
    Sum(Vec<Expr>),
    Product(Vec<Expr>),
    Power(Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "E" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

/// Elementary functions understood by the parser, evaluator and printer.
///
/// `sqrt` is not listed: it parses straight into a power of one half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Abs,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "atan2" => Function::Atan2,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "exp" => Function::Exp,
            "log" => Function::Log,
            "abs" => Function::Abs,
            _ => return None,
        };
        Some(function)
    }

    /// Name as written in the input language.
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Atan2 => "atan2",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Abs => "abs",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Function::Atan2 => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn number(value: f64) -> Self {
        Expr::Number(value)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_number() == Some(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.as_number() == Some(1.0)
    }

    /// Every symbol name appearing in the expression, sorted.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Symbol(name) => {
                out.insert(name.clone());
            }
            Expr::Sum(items) | Expr::Product(items) | Expr::Call(_, items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Expr::Power(base, exponent) => {
                base.collect_symbols(out);
                exponent.collect_symbols(out);
            }
        }
    }

    pub fn contains_symbol(&self, name: &str) -> bool {
        match self {
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Symbol(symbol) => symbol == name,
            Expr::Sum(items) | Expr::Product(items) | Expr::Call(_, items) => {
                items.iter().any(|item| item.contains_symbol(name))
            }
            Expr::Power(base, exponent) => {
                base.contains_symbol(name) || exponent.contains_symbol(name)
            }
        }
    }

    /// The first infinite or NaN number in the tree.
    pub fn non_finite_number(&self) -> Option<f64> {
        match self {
            Expr::Number(value) => (!value.is_finite()).then_some(*value),
            Expr::Symbol(_) | Expr::Constant(_) => None,
            Expr::Sum(items) | Expr::Product(items) | Expr::Call(_, items) => {
                items.iter().find_map(Expr::non_finite_number)
            }
            Expr::Power(base, exponent) => base
                .non_finite_number()
                .or_else(|| exponent.non_finite_number()),
        }
    }
}

/// Returns true when `value` is a whole number small enough to print exactly.
pub(crate) fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15
}
