//! Symbolic differentiation

use super::ast::{Expr, Function};

impl Expr {
    /// Partial derivative with respect to the symbol `name`.
    pub fn derivative(&self, name: &str) -> Expr {
        if !self.contains_symbol(name) {
            return Expr::Number(0.0);
        }

        match self {
            Expr::Number(_) | Expr::Constant(_) => Expr::Number(0.0),
            Expr::Symbol(symbol) => {
                Expr::Number(if symbol == name { 1.0 } else { 0.0 })
            }
            Expr::Sum(terms) => Expr::add(terms.iter().map(|term| term.derivative(name))),
            Expr::Product(factors) => product_rule(factors, name),
            Expr::Power(base, exponent) => power_rule(base, exponent, name),
            Expr::Call(function, args) => chain_rule(*function, args, name),
        }
    }

    /// Partial derivatives with respect to each of `names`, in order.
    pub fn gradient<S: AsRef<str>>(&self, names: &[S]) -> Vec<Expr> {
        names
            .iter()
            .map(|name| self.derivative(name.as_ref()))
            .collect()
    }
}

fn product_rule(factors: &[Expr], name: &str) -> Expr {
    let terms = factors.iter().enumerate().filter_map(|(i, factor)| {
        let derivative = factor.derivative(name);
        if derivative.is_zero() {
            return None;
        }
        let others = factors
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, other)| other.clone());
        Some(Expr::mul(others.chain(std::iter::once(derivative))))
    });
    Expr::add(terms.collect::<Vec<_>>())
}

fn power_rule(base: &Expr, exponent: &Expr, name: &str) -> Expr {
    let base_derivative = base.derivative(name);

    if !exponent.contains_symbol(name) {
        // d(u^n) = n * u^(n-1) * du
        let reduced = Expr::add([exponent.clone(), Expr::Number(-1.0)]);
        return Expr::mul([
            exponent.clone(),
            Expr::pow(base.clone(), reduced),
            base_derivative,
        ]);
    }

    // d(u^v) = u^v * (dv * log(u) + v * du / u)
    let exponent_derivative = exponent.derivative(name);
    let log_term = Expr::mul([
        exponent_derivative,
        Expr::call(Function::Log, vec![base.clone()]),
    ]);
    let ratio_term = Expr::mul([
        exponent.clone(),
        base_derivative,
        Expr::pow(base.clone(), Expr::Number(-1.0)),
    ]);
    Expr::mul([
        Expr::pow(base.clone(), exponent.clone()),
        Expr::add([log_term, ratio_term]),
    ])
}

fn chain_rule(function: Function, args: &[Expr], name: &str) -> Expr {
    if function == Function::Atan2 {
        return atan2_derivative(args, name);
    }
    let Some(arg) = args.first() else {
        return Expr::Number(0.0);
    };
    let inner = arg.derivative(name);
    let arg = arg.clone();
    let one = || Expr::Number(1.0);
    let square = |e: Expr| Expr::pow(e, Expr::Number(2.0));

    let outer = match function {
        Function::Sin => Expr::call(Function::Cos, vec![arg]),
        Function::Cos => Expr::neg(Expr::call(Function::Sin, vec![arg])),
        Function::Tan => Expr::pow(
            Expr::call(Function::Cos, vec![arg]),
            Expr::Number(-2.0),
        ),
        Function::Asin => Expr::pow(
            Expr::sub(one(), square(arg)),
            Expr::Number(-0.5),
        ),
        Function::Acos => Expr::neg(Expr::pow(
            Expr::sub(one(), square(arg)),
            Expr::Number(-0.5),
        )),
        Function::Atan => Expr::pow(Expr::add([one(), square(arg)]), Expr::Number(-1.0)),
        Function::Sinh => Expr::call(Function::Cosh, vec![arg]),
        Function::Cosh => Expr::call(Function::Sinh, vec![arg]),
        Function::Tanh => Expr::pow(
            Expr::call(Function::Cosh, vec![arg]),
            Expr::Number(-2.0),
        ),
        Function::Exp => Expr::call(Function::Exp, vec![arg]),
        Function::Log => Expr::pow(arg, Expr::Number(-1.0)),
        Function::Abs => Expr::div(arg.clone(), Expr::call(Function::Abs, vec![arg])),
        Function::Atan2 => unreachable!("atan2 handled above"),
    };

    Expr::mul([outer, inner])
}

/// d atan2(y, x) = (x dy - y dx) / (x^2 + y^2)
fn atan2_derivative(args: &[Expr], name: &str) -> Expr {
    let [y, x] = args else {
        return Expr::Number(0.0);
    };
    let numerator = Expr::sub(
        Expr::mul([x.clone(), y.derivative(name)]),
        Expr::mul([y.clone(), x.derivative(name)]),
    );
    let denominator = Expr::add([
        Expr::pow(x.clone(), Expr::Number(2.0)),
        Expr::pow(y.clone(), Expr::Number(2.0)),
    ]);
    Expr::div(numerator, denominator)
}
