//! Integration tests for task execution

mod common;

use common::Harness;
use std::collections::HashMap;
use std::fs;
use taskr::runner::{Context, Executor};
use taskr::script::Parser;
use taskr::ErrorKind;
use tempfile::TempDir;

#[test]
fn test_execute_greeting() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new(
        r#"
var GREETING = "hello"
task greet:
    ech "$GREETING world"
"#,
        dir.path(),
    );

    let result = h.executor.execute_task("greet");

    assert!(result.success);
    assert_eq!(h.out.contents(), "hello world\n");
    assert!(h.err.contents().contains("Running task: greet"));
}

#[test]
fn test_declared_variable_resolution() {
    let dir = TempDir::new().unwrap();
    let h = Harness::new("var NAME = \"value with spaces\"\ntask t:\n", dir.path());

    assert_eq!(h.executor.resolve("t", "[$NAME]"), "[value with spaces]");
    assert_eq!(h.executor.resolve("t", "$UNKNOWN"), "$UNKNOWN");
}

#[test]
fn test_short_circuit_on_unknown_command() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new(
        "task t:\n    ech \"a\"\n    frobnicate \"x\"\n    ech \"b\"\n",
        dir.path(),
    );

    let result = h.executor.execute_task("t");

    assert!(!result.success);
    assert_eq!(result.kind, Some(ErrorKind::UnknownCommand));
    assert_eq!(h.out.contents(), "a\n");
}

#[test]
fn test_task_lookup_miss() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new("task real:\n    ech \"x\"\n", dir.path());

    let result = h.executor.execute_task("nope");
    assert!(!result.success);
    assert_eq!(result.message(), "Task \"nope\" not found");
}

#[test]
fn test_idempotent_delete() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new("task clean:\n    del \"build.log\"\n", dir.path());

    let first = h.executor.execute_task("clean");
    let second = h.executor.execute_task("clean");

    assert!(first.success);
    assert!(second.success);
    assert_eq!(first, second);
}

#[test]
fn test_delete_uses_arguments_and_working_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app-debug.bin"), "x").unwrap();
    let mut h = Harness::new(
        "var PREFIX = \"app\"\ntask clean:\n    del \"$PREFIX-?1.bin\"\n",
        dir.path(),
    );
    h.executor.set_task_args("clean", vec!["debug".to_string()]);

    assert!(h.executor.execute_task("clean").success);
    assert!(!dir.path().join("app-debug.bin").exists());
}

#[test]
fn test_delete_directory_fails_task() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("target")).unwrap();
    let mut h = Harness::new("task clean:\n    del \"target\"\n    ech \"done\"\n", dir.path());

    let result = h.executor.execute_task("clean");
    assert_eq!(result.kind, Some(ErrorKind::FileDeleteFault));
    assert!(h.out.contents().is_empty());
}

#[test]
fn test_runtime_variables_span_tasks() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new(
        r#"
var CHANNEL = "stable"
task pick:
    var CHANNEL = "nightly"
task show:
    ech "$CHANNEL"
"#,
        dir.path(),
    );

    assert!(h.executor.execute_task("show").success);
    assert!(h.executor.execute_task("pick").success);
    assert!(h.executor.execute_task("show").success);
    assert_eq!(h.out.contents(), "stable\nnightly\n");
}

#[test]
fn test_runtime_variable_inside_declared_value() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new(
        r#"
var TARGET = "$PROFILE/app"
task pick:
    var PROFILE = "release"
task show:
    ech "$TARGET"
"#,
        dir.path(),
    );

    assert!(h.executor.execute_task("pick").success);
    assert!(h.executor.execute_task("show").success);
    assert_eq!(h.out.contents(), "release/app\n");
}

#[test]
fn test_positional_argument_joined_to_word() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new("task t:\n    ech \"cp ?1 ?1_bak\"\n", dir.path());
    h.executor.set_task_args("t", vec!["data.db".to_string()]);

    assert!(h.executor.execute_task("t").success);
    assert_eq!(h.out.contents(), "cp data.db data.db_bak\n");
}

#[test]
fn test_named_arguments_are_shared_by_subtasks() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new(
        "task all:\n    tsk \"one\"\n    tsk \"two\"\ntask one:\n    ech \"1 ?env\"\ntask two:\n    ech \"2 ?env\"\n",
        dir.path(),
    );
    h.executor
        .set_named_args(HashMap::from([("env".to_string(), "prod".to_string())]));

    assert!(h.executor.execute_task("all").success);
    assert_eq!(h.out.contents(), "1 prod\n2 prod\n");
}

#[test]
fn test_failure_propagates_through_nested_tasks() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new(
        "task top:\n    tsk \"mid\"\n    ech \"top-after\"\ntask mid:\n    tsk \"ghost\"\n    ech \"mid-after\"\n",
        dir.path(),
    );

    let result = h.executor.execute_task("top");
    assert_eq!(result.kind, Some(ErrorKind::TaskNotFound));
    assert!(result.message().contains("ghost"));
    assert!(h.out.contents().is_empty());
}

#[test]
fn test_self_invocation_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new("task loop:\n    ech \"tick\"\n    tsk \"loop\"\n", dir.path());

    let result = h.executor.execute_task("loop");
    assert_eq!(result.kind, Some(ErrorKind::CyclicTaskInvocation));
    assert_eq!(h.out.contents(), "tick\n");
}

#[test]
fn test_env_lookup_is_injected() {
    let dir = TempDir::new().unwrap();
    let ctx = Context::new()
        .with_working_dir(dir.path().to_path_buf())
        .with_env_lookup(Box::new(|name| match name {
            "FOO" => Some("bar".to_string()),
            _ => None,
        }));
    let mut h = Harness::with_context(
        "task t:\n    ech $env(\"FOO\")/$env(\"MISSING\")/\n",
        ctx,
    );

    assert!(h.executor.execute_task("t").success);
    assert_eq!(h.out.contents(), "bar//\n");
}

#[cfg(unix)]
#[test]
fn test_run_command_output_is_forwarded() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new(
        "var WHO = \"shell\"\ntask t:\n    run \"echo hi from $WHO\"\n",
        dir.path(),
    );

    assert!(h.executor.execute_task("t").success);
    assert_eq!(h.out.contents(), "hi from shell\n");
    assert!(h.err.contents().contains("[RUN]"));
}

#[cfg(unix)]
#[test]
fn test_run_non_zero_exit_counts_as_success() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new("task t:\n    run \"exit 1\"\n    ech \"continued\"\n", dir.path());

    let result = h.executor.execute_task("t");
    assert!(result.success);
    assert_eq!(h.out.contents(), "continued\n");
}

#[cfg(unix)]
#[test]
fn test_run_non_zero_exit_fails_in_strict_mode() {
    let dir = TempDir::new().unwrap();
    let ctx = Context::new()
        .with_working_dir(dir.path().to_path_buf())
        .with_fail_on_exit_code(true);
    let mut h = Harness::with_context("task t:\n    run \"exit 1\"\n    ech \"continued\"\n", ctx);

    let result = h.executor.execute_task("t");
    assert_eq!(result.kind, Some(ErrorKind::NonZeroExit));
    assert!(h.out.contents().is_empty());
}

#[cfg(unix)]
#[test]
fn test_run_in_working_dir_then_delete() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new(
        "task t:\n    run \"touch ?1\"\n    del \"?1\"\n",
        dir.path(),
    );
    h.executor.set_task_args("t", vec!["tmp.txt".to_string()]);

    assert!(h.executor.execute_task("t").success);
    assert!(!dir.path().join("tmp.txt").exists());
}

#[test]
fn test_executor_defaults_to_current_dir() {
    let executor = Executor::new(Parser::parse("task t:\n"));
    assert_eq!(
        executor.context().working_dir,
        std::env::current_dir().unwrap()
    );
}
