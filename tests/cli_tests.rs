//! Integration tests for the CLI interface

mod common;

use assert_cmd::Command;
use common::TestContextBuilder;
use predicates::prelude::*;

#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::cargo_bin("solver-codegen").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_default_paths_in_working_directory() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_equations("hori_vert_2d(dof1, dof2) = dof1 - dof2\nnot an equation\n")
        .build()
        .unwrap();

    Command::cargo_bin("solver-codegen")
        .unwrap()
        .current_dir(ctx.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote SolverFunctions.h"))
        .stderr(predicate::str::contains(
            "Warning: line 2: the following line was ignored: not an equation",
        ));

    assert!(ctx
        .read_file("SolverFunctions.h")
        .unwrap()
        .contains("#ifndef SolverFunctionsH"));
    assert!(ctx
        .read_file("SolverFunctions.cpp")
        .unwrap()
        .contains("return dof1 - dof2;"));
}

#[test]
fn test_missing_input_fails() {
    let ctx = TestContextBuilder::new().unwrap().build().unwrap();

    Command::cargo_bin("solver-codegen")
        .unwrap()
        .current_dir(ctx.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("solver_functions.txt"));
}

#[test]
fn test_compile_error_fails_without_writing() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_equations("broken(a) = a +\n")
        .build()
        .unwrap();

    Command::cargo_bin("solver-codegen")
        .unwrap()
        .current_dir(ctx.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken"));

    assert!(!ctx.file_exists("SolverFunctions.h"));
    assert!(!ctx.file_exists("SolverFunctions.cpp"));
}

#[test]
fn test_policy_flag_overrides_config_file() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_file("codegen.toml", "input = \"eqs.txt\"\npolicy = \"abort\"\n")
        .with_file("eqs.txt", "broken(a) = a +\nok(b) = b\n")
        .build()
        .unwrap();

    Command::cargo_bin("solver-codegen")
        .unwrap()
        .current_dir(ctx.path())
        .args(["--policy", "best-effort"])
        .assert()
        .success()
        .stderr(predicate::str::contains("record rejected"));

    assert!(ctx.read_file("SolverFunctions.h").unwrap().contains("class ok"));
}

#[test]
fn test_explicit_paths_and_dry_run() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_file("in/equations.txt", "f(a, b) [x = 2*y, y = 3] = a*x + b\n")
        .build()
        .unwrap();

    Command::cargo_bin("solver-codegen")
        .unwrap()
        .current_dir(ctx.path())
        .args([
            "--input",
            "in/equations.txt",
            "--declarations",
            "out.h",
            "--definitions",
            "out.cpp",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("f(a, b) = 6*a + b"));

    assert!(!ctx.file_exists("out.h"));
    assert!(!ctx.file_exists("out.cpp"));
}

#[test]
fn test_unknown_config_key_is_reported() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_equations("f(a) = a\n")
        .with_file("codegen.toml", "outptu = 1\n")
        .build()
        .unwrap();

    Command::cargo_bin("solver-codegen")
        .unwrap()
        .current_dir(ctx.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("codegen.toml"));
}
