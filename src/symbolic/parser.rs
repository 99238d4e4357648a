//! Expression parser
//!
//! Uses the `expr.pest` grammar for tokens and a Pratt parser for operator
//! precedence. Precedence, lowest first: `+ -`, `* /`, unary `-`, `**`/`^`
//! (right associative), matching the usual mathematical convention so that
//! `-x**2` means `-(x**2)`.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

use super::ast::{Constant, Expr, Function};
use super::ExprError;

#[derive(Parser)]
#[grammar = "symbolic/expr.pest"]
struct ExprGrammar;

static PRATT: Lazy<PrattParser<Rule>> = Lazy::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left) | Op::infix(Rule::div, Assoc::Left))
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos))
        .op(Op::infix(Rule::pow, Assoc::Right))
});

/// Names that must parse as free symbols.
///
/// A vocabulary name shadows a built-in constant or function of the same
/// spelling, so a parameter called `E` stays a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    names: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parse `text` into an expression, treating vocabulary names as symbols.
pub fn parse(text: &str, vocabulary: &Vocabulary) -> Result<Expr, ExprError> {
    let mut pairs = ExprGrammar::parse(Rule::expression, text).map_err(syntax_error)?;
    let expr = pairs
        .next()
        .and_then(|expression| expression.into_inner().next())
        .ok_or_else(|| ExprError::Syntax("empty expression".to_string()))?;
    build(expr.into_inner(), vocabulary)
}

fn syntax_error(err: pest::error::Error<Rule>) -> ExprError {
    let column = match err.line_col {
        LineColLocation::Pos((_, column)) | LineColLocation::Span((_, column), _) => column,
    };
    ExprError::Syntax(format!("{} at column {column}", err.variant.message()))
}

fn build(pairs: Pairs<'_, Rule>, vocabulary: &Vocabulary) -> Result<Expr, ExprError> {
    PRATT
        .map_primary(|primary| build_primary(primary, vocabulary))
        .map_prefix(|op, rhs| {
            let rhs = rhs?;
            match op.as_rule() {
                Rule::neg => Ok(Expr::neg(rhs)),
                _ => Ok(rhs),
            }
        })
        .map_infix(|lhs, op, rhs| {
            let (lhs, rhs) = (lhs?, rhs?);
            let combined = match op.as_rule() {
                Rule::add => Expr::add([lhs, rhs]),
                Rule::sub => Expr::sub(lhs, rhs),
                Rule::mul => Expr::mul([lhs, rhs]),
                Rule::div => Expr::div(lhs, rhs),
                Rule::pow => Expr::pow(lhs, rhs),
                rule => unreachable!("grammar produced unexpected operator {rule:?}"),
            };
            Ok(combined)
        })
        .parse(pairs)
}

fn build_primary(pair: Pair<'_, Rule>, vocabulary: &Vocabulary) -> Result<Expr, ExprError> {
    match pair.as_rule() {
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Expr::Number)
            .ok_or_else(|| ExprError::InvalidNumber(pair.as_str().to_string())),
        Rule::ident => Ok(identifier(pair.as_str(), vocabulary)),
        Rule::call => build_call(pair, vocabulary),
        Rule::expr => build(pair.into_inner(), vocabulary),
        rule => unreachable!("grammar produced unexpected primary {rule:?}"),
    }
}

fn identifier(name: &str, vocabulary: &Vocabulary) -> Expr {
    if vocabulary.contains(name) {
        return Expr::symbol(name);
    }
    if let Some(constant) = Constant::from_name(name) {
        return Expr::Constant(constant);
    }
    debug!(symbol = name, "identifier outside the vocabulary kept as a free symbol");
    Expr::symbol(name)
}

fn build_call(pair: Pair<'_, Rule>, vocabulary: &Vocabulary) -> Result<Expr, ExprError> {
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .map(|ident| ident.as_str().to_string())
        .ok_or_else(|| ExprError::Syntax("call without a function name".to_string()))?;
    let mut args = inner
        .map(|arg| build(arg.into_inner(), vocabulary))
        .collect::<Result<Vec<_>, _>>()?;

    if vocabulary.contains(&name) {
        return Err(ExprError::NotCallable(name));
    }

    if name == "sqrt" {
        if args.len() != 1 {
            return Err(ExprError::Arity {
                function: name,
                expected: 1,
                found: args.len(),
            });
        }
        return Ok(Expr::pow(args.remove(0), Expr::Number(0.5)));
    }

    let function =
        Function::from_name(&name).ok_or_else(|| ExprError::UnknownFunction(name.clone()))?;
    if args.len() != function.arity() {
        return Err(ExprError::Arity {
            function: name,
            expected: function.arity(),
            found: args.len(),
        });
    }
    Ok(Expr::call(function, args))
}
