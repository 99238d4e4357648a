//! Simplifying constructors
//!
//! Every tree the engine produces is built through these functions. They
//! flatten nested sums and products, fold numeric coefficients, collect like
//! terms and merge equal bases. Term order is first appearance, never sorted,
//! so the same input always yields the same tree and the same emitted text.

use super::ast::{is_integral, Expr, Function};

impl Expr {
    /// Sum of `terms` with like terms collected.
    pub fn add<I>(terms: I) -> Expr
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut constant = 0.0;
        let mut collected: Vec<(f64, Expr)> = Vec::new();
        for term in terms {
            push_term(term, &mut constant, &mut collected);
        }

        let mut out = Vec::with_capacity(collected.len() + 1);
        if constant != 0.0 {
            out.push(Expr::Number(constant));
        }
        for (coefficient, rest) in collected {
            if coefficient == 0.0 {
                continue;
            }
            if coefficient == 1.0 {
                out.push(rest);
            } else {
                out.push(Expr::mul([Expr::Number(coefficient), rest]));
            }
        }

        match out.len() {
            0 => Expr::Number(0.0),
            1 => out.remove(0),
            _ => Expr::Sum(out),
        }
    }

    /// Product of `factors` with the numeric coefficient folded to the front.
    pub fn mul<I>(factors: I) -> Expr
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut coefficient = 1.0;
        let mut powers: Vec<(Expr, Expr)> = Vec::new();
        for factor in factors {
            push_factor(factor, &mut coefficient, &mut powers);
        }
        if coefficient == 0.0 {
            return Expr::Number(0.0);
        }

        let mut out = Vec::with_capacity(powers.len() + 1);
        for (base, exponent) in powers {
            if let Some(divisor) = exact_reciprocal(&base, &exponent, coefficient) {
                coefficient /= divisor;
                continue;
            }
            match Expr::pow(base, exponent) {
                Expr::Number(value) => coefficient *= value,
                other => out.push(other),
            }
        }

        if coefficient == 0.0 {
            return Expr::Number(0.0);
        }
        if out.is_empty() {
            return Expr::Number(coefficient);
        }
        if coefficient != 1.0 {
            out.insert(0, Expr::Number(coefficient));
        }
        match out.len() {
            1 => out.remove(0),
            _ => Expr::Product(out),
        }
    }

    pub fn pow(base: Expr, exponent: Expr) -> Expr {
        if exponent.is_zero() || base.is_one() {
            return Expr::Number(1.0);
        }
        if exponent.is_one() {
            return base;
        }

        match (&base, exponent.as_number()) {
            (Expr::Number(b), Some(e))
                if is_integral(e) && e > 0.0 && b.powf(e).is_finite() =>
            {
                return Expr::Number(b.powf(e));
            }
            (Expr::Number(b), Some(e)) if *b == 0.0 && e > 0.0 => {
                return Expr::Number(0.0);
            }
            (Expr::Power(inner, inner_exponent), Some(e)) if is_integral(e) => {
                let merged = Expr::mul([(**inner_exponent).clone(), Expr::Number(e)]);
                return Expr::pow((**inner).clone(), merged);
            }
            _ => {}
        }

        Expr::Power(Box::new(base), Box::new(exponent))
    }

    pub fn call(function: Function, args: Vec<Expr>) -> Expr {
        if let [arg] = args.as_slice() {
            let folded = match function {
                Function::Sin
                | Function::Tan
                | Function::Asin
                | Function::Atan
                | Function::Sinh
                | Function::Tanh
                    if arg.is_zero() =>
                {
                    Some(0.0)
                }
                Function::Cos | Function::Cosh | Function::Exp if arg.is_zero() => Some(1.0),
                Function::Log if arg.is_one() => Some(0.0),
                _ => None,
            };
            if let Some(value) = folded {
                return Expr::Number(value);
            }
        }
        Expr::Call(function, args)
    }

    pub fn neg(expr: Expr) -> Expr {
        Expr::mul([Expr::Number(-1.0), expr])
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Expr {
        Expr::add([lhs, Expr::neg(rhs)])
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Expr {
        Expr::mul([lhs, Expr::pow(rhs, Expr::Number(-1.0))])
    }
}

fn push_term(term: Expr, constant: &mut f64, collected: &mut Vec<(f64, Expr)>) {
    match term {
        Expr::Sum(items) => {
            for item in items {
                push_term(item, constant, collected);
            }
        }
        Expr::Number(value) => *constant += value,
        other => {
            let (coefficient, rest) = split_coefficient(other);
            match collected.iter_mut().find(|(_, existing)| equivalent(existing, &rest)) {
                Some(entry) => entry.0 += coefficient,
                None => collected.push((coefficient, rest)),
            }
        }
    }
}

fn split_coefficient(term: Expr) -> (f64, Expr) {
    match term {
        Expr::Product(mut factors) => {
            let Some(Expr::Number(coefficient)) = factors.first().cloned() else {
                return (1.0, Expr::Product(factors));
            };
            factors.remove(0);
            let rest = match factors.len() {
                1 => factors.remove(0),
                _ => Expr::Product(factors),
            };
            (coefficient, rest)
        }
        other => (1.0, other),
    }
}

fn push_factor(factor: Expr, coefficient: &mut f64, powers: &mut Vec<(Expr, Expr)>) {
    match factor {
        Expr::Product(items) => {
            for item in items {
                push_factor(item, coefficient, powers);
            }
        }
        Expr::Number(value) => *coefficient *= value,
        other => {
            let (base, exponent) = match other {
                Expr::Power(base, exponent) => (*base, *exponent),
                other => (other, Expr::Number(1.0)),
            };
            match powers.iter_mut().find(|(existing, _)| equivalent(existing, &base)) {
                Some(entry) => {
                    let previous = std::mem::replace(&mut entry.1, Expr::Number(0.0));
                    entry.1 = Expr::add([previous, exponent]);
                }
                None => powers.push((base, exponent)),
            }
        }
    }
}

/// Structural equality that ignores the order of sum terms and product
/// factors, so `a*b` and `b*a` are the same term.
pub(crate) fn equivalent(lhs: &Expr, rhs: &Expr) -> bool {
    match (lhs, rhs) {
        (Expr::Sum(left), Expr::Sum(right)) | (Expr::Product(left), Expr::Product(right)) => {
            same_multiset(left, right)
        }
        (Expr::Power(lb, le), Expr::Power(rb, re)) => equivalent(lb, rb) && equivalent(le, re),
        (Expr::Call(lf, la), Expr::Call(rf, ra)) => {
            lf == rf && la.len() == ra.len() && la.iter().zip(ra).all(|(l, r)| equivalent(l, r))
        }
        _ => lhs == rhs,
    }
}

fn same_multiset(left: &[Expr], right: &[Expr]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut used = vec![false; right.len()];
    left.iter().all(|item| {
        let found = right
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && equivalent(item, candidate));
        match found {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// For `n^-k` with an integral result of `coefficient / n^k`, the value `n^k`.
fn exact_reciprocal(base: &Expr, exponent: &Expr, coefficient: f64) -> Option<f64> {
    let (Expr::Number(b), Some(e)) = (base, exponent.as_number()) else {
        return None;
    };
    if !is_integral(e) || e >= 0.0 || *b == 0.0 {
        return None;
    }
    let divisor = b.powi(-e as i32);
    let quotient = coefficient / divisor;
    is_integral(quotient).then_some(divisor)
}
