//! Serialization of expressions to text
//!
//! Two dialects share one precedence-aware printer: the input language
//! (`Display`, re-parseable) and C++ (`Expr::to_cpp`). The C++ output never
//! divides two integer literals and uses `pow`/`sqrt` from `<cmath>`.

use std::fmt;

use super::ast::{is_integral, Constant, Expr, Function};
use super::ExprError;

const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_POWER: u8 = 3;
const PREC_ATOM: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Source,
    Cpp,
}

struct Printed {
    text: String,
    precedence: u8,
}

impl Printed {
    fn new(text: String, precedence: u8) -> Self {
        Self { text, precedence }
    }
}

struct Printer {
    dialect: Dialect,
}

impl Printer {
    fn print(&self, expr: &Expr) -> Printed {
        match expr {
            Expr::Number(value) => {
                let precedence = if *value < 0.0 { PREC_SUM } else { PREC_ATOM };
                Printed::new(self.number(*value, false), precedence)
            }
            Expr::Symbol(name) => Printed::new(name.clone(), PREC_ATOM),
            Expr::Constant(constant) => Printed::new(self.constant(*constant), PREC_ATOM),
            Expr::Sum(terms) => self.sum(terms),
            Expr::Product(factors) => self.product(factors),
            Expr::Power(base, exponent) => self.power(expr, base, exponent),
            Expr::Call(function, args) => {
                let args: Vec<String> = args.iter().map(|arg| self.print(arg).text).collect();
                Printed::new(
                    format!("{}({})", self.function(*function), args.join(", ")),
                    PREC_ATOM,
                )
            }
        }
    }

    fn print_at(&self, expr: &Expr, min_precedence: u8) -> String {
        let printed = self.print(expr);
        if printed.precedence < min_precedence {
            format!("({})", printed.text)
        } else {
            printed.text
        }
    }

    fn sum(&self, terms: &[Expr]) -> Printed {
        let mut text = String::new();
        for (i, term) in terms.iter().enumerate() {
            let (negative, magnitude) = split_sign(term);
            let body = self.print_at(&magnitude, PREC_PRODUCT);
            match (i, negative) {
                (0, false) => text.push_str(&body),
                (0, true) => {
                    text.push('-');
                    text.push_str(&body);
                }
                (_, false) => {
                    text.push_str(" + ");
                    text.push_str(&body);
                }
                (_, true) => {
                    text.push_str(" - ");
                    text.push_str(&body);
                }
            }
        }
        Printed::new(text, PREC_SUM)
    }

    fn product(&self, factors: &[Expr]) -> Printed {
        let mut coefficient = 1.0;
        let mut numerator = Vec::new();
        let mut denominator = Vec::new();

        for factor in factors {
            match factor {
                Expr::Number(value) => coefficient *= value,
                Expr::Power(base, exponent) => match exponent.as_number() {
                    Some(e) if e < 0.0 => {
                        denominator.push(Expr::pow((**base).clone(), Expr::Number(-e)))
                    }
                    _ => numerator.push(factor.clone()),
                },
                other => numerator.push(other.clone()),
            }
        }

        let negative = coefficient < 0.0;
        let coefficient = coefficient.abs();

        let mut parts = Vec::new();
        if coefficient != 1.0 || numerator.is_empty() {
            let force_float = numerator.is_empty() && !denominator.is_empty();
            parts.push(self.number(coefficient, force_float));
        }
        for factor in &numerator {
            parts.push(self.print_at(factor, PREC_PRODUCT));
        }
        let mut text = parts.join("*");

        match denominator.as_slice() {
            [] => {}
            [single] => {
                text.push('/');
                let rendered = match single {
                    Expr::Number(value) => self.number(*value, true),
                    other => self.print_at(other, PREC_POWER),
                };
                text.push_str(&rendered);
            }
            factors => {
                let rendered: Vec<String> = factors
                    .iter()
                    .map(|factor| match factor {
                        Expr::Number(value) => self.number(*value, true),
                        other => self.print_at(other, PREC_PRODUCT),
                    })
                    .collect();
                text.push_str(&format!("/({})", rendered.join("*")));
            }
        }

        if negative {
            Printed::new(format!("-{text}"), PREC_SUM)
        } else {
            Printed::new(text, PREC_PRODUCT)
        }
    }

    fn power(&self, whole: &Expr, base: &Expr, exponent: &Expr) -> Printed {
        match exponent.as_number() {
            Some(e) if e < 0.0 => return self.product(std::slice::from_ref(whole)),
            Some(e) if e == 0.5 => {
                return Printed::new(format!("sqrt({})", self.print(base).text), PREC_ATOM)
            }
            _ => {}
        }

        match self.dialect {
            Dialect::Cpp => Printed::new(
                format!(
                    "pow({}, {})",
                    self.print(base).text,
                    self.print(exponent).text
                ),
                PREC_ATOM,
            ),
            Dialect::Source => Printed::new(
                format!(
                    "{}**{}",
                    self.print_at(base, PREC_ATOM),
                    self.print_at(exponent, PREC_ATOM)
                ),
                PREC_POWER,
            ),
        }
    }

    fn number(&self, value: f64, force_float: bool) -> String {
        if is_integral(value) {
            if force_float && self.dialect == Dialect::Cpp {
                format!("{value:.1}")
            } else {
                format!("{}", value as i64)
            }
        } else {
            format!("{value:?}")
        }
    }

    fn constant(&self, constant: Constant) -> String {
        let text = match (self.dialect, constant) {
            (Dialect::Source, Constant::Pi) => "pi",
            (Dialect::Source, Constant::E) => "E",
            (Dialect::Cpp, Constant::Pi) => "M_PI",
            (Dialect::Cpp, Constant::E) => "M_E",
        };
        text.to_string()
    }

    fn function(&self, function: Function) -> &'static str {
        match (self.dialect, function) {
            (Dialect::Cpp, Function::Abs) => "fabs",
            _ => function.name(),
        }
    }
}

/// Splits a sum term into its sign and magnitude.
fn split_sign(term: &Expr) -> (bool, Expr) {
    match term {
        Expr::Number(value) if *value < 0.0 => (true, Expr::Number(-value)),
        Expr::Product(factors) => match factors.first() {
            Some(Expr::Number(coefficient)) if *coefficient < 0.0 => {
                let magnitude = std::iter::once(Expr::Number(-coefficient))
                    .chain(factors[1..].iter().cloned());
                (true, Expr::mul(magnitude))
            }
            _ => (false, term.clone()),
        },
        _ => (false, term.clone()),
    }
}

impl Expr {
    /// C++ source text for this expression.
    ///
    /// Fails when the tree holds an infinite or NaN number, which has no C++
    /// literal.
    pub fn to_cpp(&self) -> Result<String, ExprError> {
        if let Some(value) = self.non_finite_number() {
            return Err(ExprError::NonFinite(value));
        }
        Ok(Printer {
            dialect: Dialect::Cpp,
        }
        .print(self)
        .text)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printer = Printer {
            dialect: Dialect::Source,
        };
        f.write_str(&printer.print(self).text)
    }
}
