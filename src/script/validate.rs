//! Static script validation
//!
//! Execution never requires a script to validate; these checks back the
//! `--check` flag and catch mistakes before anything runs.

use crate::error::{ConfigError, ConfigResult};
use crate::script::types::{Script, Task};
use std::collections::HashSet;

/// Validate a complete script
pub fn validate_script(script: &Script) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for task in &script.tasks {
        if !seen.insert(task.name.as_str()) {
            return Err(ConfigError::DuplicateTask {
                name: task.name.clone(),
                line: task.line,
            });
        }
        validate_task(script, task)?;
    }

    detect_circular_task_invocations(script)?;

    Ok(())
}

/// Validate the commands of a single task
pub fn validate_task(script: &Script, task: &Task) -> ConfigResult<()> {
    for cmd in &task.commands {
        let kind = cmd.kind().ok_or_else(|| ConfigError::UnknownCommand {
            task: task.name.clone(),
            keyword: cmd.name.clone(),
            line: cmd.line,
        })?;

        let expected = kind.arity();
        if cmd.args.len() < expected {
            return Err(ConfigError::Arity {
                task: task.name.clone(),
                keyword: cmd.name.clone(),
                expected,
                found: cmd.args.len(),
                line: cmd.line,
            });
        }
    }

    for target in literal_subtasks(task) {
        if script.find_task(target).is_none() {
            return Err(ConfigError::TaskNotFound(target.to_string()));
        }
    }

    Ok(())
}

/// `tsk` targets that contain no variable or argument references
fn literal_subtasks(task: &Task) -> impl Iterator<Item = &str> {
    task.commands
        .iter()
        .filter(|cmd| cmd.name == "tsk")
        .filter_map(|cmd| cmd.args.first())
        .filter(|target| !target.contains('$') && !target.contains('?'))
        .map(String::as_str)
}

/// Detect cycles through literal `tsk` references
fn detect_circular_task_invocations(script: &Script) -> ConfigResult<()> {
    let mut visited = HashSet::new();
    for task in &script.tasks {
        let mut stack = Vec::new();
        check_task_cycle(script, &task.name, &mut visited, &mut stack)?;
    }
    Ok(())
}

fn check_task_cycle(
    script: &Script,
    task_name: &str,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> ConfigResult<()> {
    if stack.iter().any(|t| t == task_name) {
        stack.push(task_name.to_string());
        return Err(ConfigError::CircularDependency(stack.join(" -> ")));
    }

    if visited.contains(task_name) {
        return Ok(());
    }

    let task = script
        .find_task(task_name)
        .ok_or_else(|| ConfigError::TaskNotFound(task_name.to_string()))?;

    stack.push(task_name.to_string());
    for target in literal_subtasks(task) {
        check_task_cycle(script, target, visited, stack)?;
    }
    stack.pop();
    visited.insert(task_name.to_string());

    Ok(())
}
