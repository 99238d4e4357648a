//! End-to-end generation through the library API

mod common;

use common::{demo_equations, TestContextBuilder};
use solver_codegen::config::{FailurePolicy, GeneratorConfig, OutputPaths};
use solver_codegen::render::TemplateSet;
use solver_codegen::{run, Diagnostic, GeneratorError, Generator};
use std::collections::HashMap;

const TWO_VALID_ONE_MALFORMED: &str = "\
# two functions and a typo
hori_vert_2d(dof1, dof2) = dof1 - dof2
this line is not an equation
scaled(a, b) [x = 2*y, y = 3] = a*x + b   # rightmost substitution first
";

fn config_for(ctx: &common::TestContext) -> GeneratorConfig {
    GeneratorConfig {
        input: ctx.join("solver_functions.txt"),
        output: OutputPaths {
            declarations: ctx.join("SolverFunctions.h"),
            definitions: ctx.join("SolverFunctions.cpp"),
        },
        ..GeneratorConfig::default()
    }
}

#[test]
fn test_two_valid_records_and_one_malformed_line() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_equations(TWO_VALID_ONE_MALFORMED)
        .build()
        .unwrap();

    let outcome = run(&config_for(&ctx), false).unwrap();

    assert_eq!(
        outcome.report.diagnostics,
        vec![Diagnostic::SkippedLine {
            line_number: 3,
            text: "this line is not an equation".to_string(),
        }]
    );
    assert_eq!(outcome.written.len(), 2);

    let header = ctx.read_file("SolverFunctions.h").unwrap();
    let source = ctx.read_file("SolverFunctions.cpp").unwrap();
    assert_eq!(header.matches(": public SolverFunctionsBase").count(), 2);
    assert!(header.find("class hori_vert_2d") < header.find("class scaled"));
    assert!(source.find("\"hori_vert_2d\"") < source.find("\"scaled\""));
    assert!(source.contains("return 6*a + b;"));
    assert!(!source.contains("this line"));
}

#[test]
fn test_regeneration_is_byte_identical() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_equations(&demo_equations().unwrap())
        .build()
        .unwrap();
    let config = config_for(&ctx);

    run(&config, false).unwrap();
    let first = (
        ctx.read_file("SolverFunctions.h").unwrap(),
        ctx.read_file("SolverFunctions.cpp").unwrap(),
    );
    run(&config, false).unwrap();
    let second = (
        ctx.read_file("SolverFunctions.h").unwrap(),
        ctx.read_file("SolverFunctions.cpp").unwrap(),
    );
    assert_eq!(first, second);
}

#[test]
fn test_fatal_error_writes_nothing() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_equations("good(a) = a\nbad(a) = (a +\n")
        .build()
        .unwrap();

    let err = run(&config_for(&ctx), false).unwrap_err();
    assert!(matches!(err, GeneratorError::ExpressionCompile { ref function, .. } if function == "bad"));
    assert!(!ctx.file_exists("SolverFunctions.h"));
    assert!(!ctx.file_exists("SolverFunctions.cpp"));
}

#[test]
fn test_best_effort_writes_the_remaining_records() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_equations("good(a) = a\nbad(a) = (a +\nalso_good(b) = 2*b\n")
        .build()
        .unwrap();
    let config = GeneratorConfig {
        policy: FailurePolicy::BestEffort,
        ..config_for(&ctx)
    };

    let outcome = run(&config, false).unwrap();
    assert_eq!(outcome.report.equations.len(), 2);
    assert!(matches!(
        outcome.report.diagnostics.as_slice(),
        [Diagnostic::RejectedRecord { line_number: 2, .. }]
    ));
    let header = ctx.read_file("SolverFunctions.h").unwrap();
    assert!(header.contains("class also_good"));
    assert!(!header.contains("class bad"));
}

#[test]
fn test_dry_run_leaves_outputs_alone() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_equations("f(a) = a\n")
        .with_file("SolverFunctions.h", "previous")
        .build()
        .unwrap();

    let outcome = run(&config_for(&ctx), true).unwrap();
    assert!(outcome.written.is_empty());
    assert!(outcome.artifacts.declarations.contains("class f"));
    assert_eq!(ctx.read_file("SolverFunctions.h").unwrap(), "previous");
    assert!(!ctx.file_exists("SolverFunctions.cpp"));
}

#[test]
fn test_demo_equations_all_resolve() {
    let templates = TemplateSet::builtin().unwrap();
    let report = Generator::new(&templates, FailurePolicy::Abort)
        .process(&demo_equations().unwrap())
        .unwrap();

    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(report.equations.len(), 15);
    for equation in &report.equations {
        assert!(
            equation.unresolved_symbols().is_empty(),
            "{} keeps {:?}",
            equation.name,
            equation.unresolved_symbols()
        );
    }
}

#[test]
fn test_demo_gradients_match_finite_differences() {
    let templates = TemplateSet::builtin().unwrap();
    let report = Generator::new(&templates, FailurePolicy::Abort)
        .process(&demo_equations().unwrap())
        .unwrap();

    let step = 1e-6;
    for equation in &report.equations {
        let point: HashMap<String, f64> = equation
            .parameters
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), 0.3 + 0.7 * i as f64 + 0.11 * (i * i) as f64))
            .collect();

        for (name, partial) in equation.parameters.iter().zip(equation.gradient()) {
            let analytic = partial.evaluate(&point).unwrap();

            let mut ahead = point.clone();
            let mut behind = point.clone();
            *ahead.get_mut(name).unwrap() += step;
            *behind.get_mut(name).unwrap() -= step;
            let numeric = (equation.expression.evaluate(&ahead).unwrap()
                - equation.expression.evaluate(&behind).unwrap())
                / (2.0 * step);

            assert!(
                (analytic - numeric).abs() <= 1e-5 * (1.0 + analytic.abs()),
                "d{}/d{}: analytic {analytic}, numeric {numeric}",
                equation.name,
                name
            );
        }
    }
}
