//! Numeric evaluation of expressions

use std::collections::HashMap;

use super::ast::{Expr, Function};
use super::ExprError;

impl Expr {
    /// Evaluate with every free symbol bound in `bindings`.
    pub fn evaluate(&self, bindings: &HashMap<String, f64>) -> Result<f64, ExprError> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Constant(constant) => Ok(constant.value()),
            Expr::Symbol(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| ExprError::UnboundSymbol(name.clone())),
            Expr::Sum(terms) => terms
                .iter()
                .try_fold(0.0, |acc, term| Ok(acc + term.evaluate(bindings)?)),
            Expr::Product(factors) => factors
                .iter()
                .try_fold(1.0, |acc, factor| Ok(acc * factor.evaluate(bindings)?)),
            Expr::Power(base, exponent) => {
                let base = base.evaluate(bindings)?;
                let exponent = exponent.evaluate(bindings)?;
                Ok(base.powf(exponent))
            }
            Expr::Call(function, args) => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(bindings))
                    .collect::<Result<Vec<_>, _>>()?;
                apply(*function, &values)
            }
        }
    }
}

fn apply(function: Function, values: &[f64]) -> Result<f64, ExprError> {
    if values.len() != function.arity() {
        return Err(ExprError::Arity {
            function: function.name().to_string(),
            expected: function.arity(),
            found: values.len(),
        });
    }
    let x = values[0];
    let value = match function {
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
        Function::Asin => x.asin(),
        Function::Acos => x.acos(),
        Function::Atan => x.atan(),
        Function::Atan2 => x.atan2(values[1]),
        Function::Sinh => x.sinh(),
        Function::Cosh => x.cosh(),
        Function::Tanh => x.tanh(),
        Function::Exp => x.exp(),
        Function::Log => x.ln(),
        Function::Abs => x.abs(),
    };
    Ok(value)
}
