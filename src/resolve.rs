//! Substitution resolution
//!
//! Substitutions are applied right to left. An entry may reference names
//! declared further right in the same block, so by the time an entry is
//! applied every name its value mentions already has a concrete value.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dsl::{EquationRecord, Substitution};
use crate::error::{GeneratorError, Result};
use crate::symbolic::{parse, Expr, ExprError, Vocabulary};

/// An equation record whose expression has been parsed and had every
/// substitution applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEquation {
    pub line_number: usize,
    pub name: String,
    pub parameters: Vec<String>,
    pub substitutions: Vec<Substitution>,
    pub expression: Expr,
}

impl ResolvedEquation {
    /// Free symbols of the expression that are not parameters.
    ///
    /// Non-empty when a substitution name was never eliminated or the
    /// expression mentions an undeclared name. Such symbols are kept as-is.
    pub fn unresolved_symbols(&self) -> BTreeSet<String> {
        let mut symbols = self.expression.free_symbols();
        for parameter in &self.parameters {
            symbols.remove(parameter);
        }
        symbols
    }

    /// Partial derivatives of the expression, one per parameter, in order.
    pub fn gradient(&self) -> Vec<Expr> {
        self.expression.gradient(&self.parameters)
    }
}

/// Resolve one record. Depends on nothing but the record itself.
pub fn resolve(record: &EquationRecord) -> Result<ResolvedEquation> {
    let compile = |text: &str, vocabulary: &Vocabulary| {
        parse(text, vocabulary).map_err(|source| GeneratorError::ExpressionCompile {
            function: record.name.clone(),
            text: text.to_string(),
            source,
        })
    };

    let full_vocabulary = Vocabulary::new(
        record
            .parameters
            .iter()
            .chain(record.substitutions.iter().map(|s| &s.name))
            .cloned(),
    );
    let mut expression = compile(&record.expression_text, &full_vocabulary)?;

    let mut introduced = Vocabulary::new(record.parameters.iter().cloned());
    let mut known: Vec<(&str, Expr)> = Vec::with_capacity(record.substitutions.len());

    for substitution in record.substitutions.iter().rev() {
        let mut value = compile(&substitution.text, &introduced)?;
        for (name, resolved) in &known {
            value = value.substitute(name, resolved);
        }
        debug!(
            function = %record.name,
            name = %substitution.name,
            value = %value,
            "applying substitution"
        );

        expression = expression.substitute(&substitution.name, &value);
        introduced.insert(substitution.name.clone());
        known.push((substitution.name.as_str(), value));
    }

    // Constant folding can overflow even when every literal is finite.
    if let Some(value) = expression.non_finite_number() {
        return Err(GeneratorError::ExpressionCompile {
            function: record.name.clone(),
            text: record.expression_text.clone(),
            source: ExprError::NonFinite(value),
        });
    }

    Ok(ResolvedEquation {
        line_number: record.line_number,
        name: record.name.clone(),
        parameters: record.parameters.clone(),
        substitutions: record.substitutions.clone(),
        expression,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{parse_record, RecordLine};
    use std::collections::HashMap;

    fn record(text: &str) -> EquationRecord {
        parse_record(&RecordLine {
            line_number: 1,
            text: text.to_string(),
        })
        .unwrap()
    }

    fn eval(equation: &ResolvedEquation, bindings: &[(&str, f64)]) -> f64 {
        let bindings: HashMap<String, f64> = bindings
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        equation.expression.evaluate(&bindings).unwrap()
    }

    #[test]
    fn test_rightmost_substitution_applies_first() {
        let equation = resolve(&record("f(a,b) [x=2*y, y=3] = a*x + b")).unwrap();
        assert_eq!(equation.expression.to_string(), "6*a + b");
        assert!(equation.unresolved_symbols().is_empty());
        assert_eq!(eval(&equation, &[("a", 2.0), ("b", 5.0)]), 17.0);
    }

    #[test]
    fn test_chained_substitutions() {
        let equation = resolve(&record(
            "dist(x1,y1,x2,y2,d) [len = sqrt(dx**2 + dy**2), dx = x1 - x2, dy = y1 - y2] = len - d",
        ))
        .unwrap();
        assert!(equation.unresolved_symbols().is_empty());
        let value = eval(
            &equation,
            &[("x1", 3.0), ("y1", 4.0), ("x2", 0.0), ("y2", 0.0), ("d", 1.0)],
        );
        assert!((value - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_substitutions() {
        let equation = resolve(&record("hori_vert_2d(dof1,dof2) = dof1 - dof2")).unwrap();
        assert_eq!(equation.expression.to_cpp().unwrap(), "dof1 - dof2");
        assert_eq!(
            equation.gradient(),
            vec![Expr::Number(1.0), Expr::Number(-1.0)]
        );
    }

    #[test]
    fn test_unmatched_name_remains_free() {
        // `k` is never substituted: it survives as a free symbol.
        let equation = resolve(&record("f(a) [x = k*a] = x + 1")).unwrap();
        let unresolved: Vec<_> = equation.unresolved_symbols().into_iter().collect();
        assert_eq!(unresolved, vec!["k"]);
    }

    #[test]
    fn test_substitution_name_shadowing_a_constant() {
        let equation = resolve(&record("f(a) [E = 2] = a*E")).unwrap();
        assert_eq!(equation.expression.to_string(), "2*a");
    }

    #[test]
    fn test_unparseable_expression_names_function() {
        let err = resolve(&record("broken(a) = a +")).unwrap_err();
        match err {
            GeneratorError::ExpressionCompile {
                function,
                text,
                source,
            } => {
                assert_eq!(function, "broken");
                assert_eq!(text, "a +");
                assert!(matches!(source, ExprError::Syntax(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_substitution_names_its_text() {
        let err = resolve(&record("f(a) [x = 2**] = a*x")).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::ExpressionCompile { ref text, .. } if text == "2**"
        ));
    }

    #[test]
    fn test_overflow_during_folding_is_a_compile_error() {
        let err = resolve(&record("f(a) = 1e300*1e300*a")).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::ExpressionCompile { source: ExprError::NonFinite(_), .. }
        ));

        let err = resolve(&record("g(a) = 1e400*a")).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::ExpressionCompile { source: ExprError::InvalidNumber(_), .. }
        ));
    }
}
