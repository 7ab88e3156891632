//! Side effects of the `run`, `del` and `ech` commands
//!
//! Each handler receives an argument that has already been interpolated.

use crate::error::{CommandResult, ExecutionError};
use crate::runner::Context;
use std::fs;
use std::io;
use std::process::{Command as StdCommand, ExitStatus, Stdio};

/// Run a shell command in the working directory and wait for it
///
/// A non-zero exit status is only a failure when the context asks for it;
/// otherwise the command fails only if the interpreter cannot be spawned.
pub fn run_shell(exec_str: &str, ctx: &mut Context) -> CommandResult<Option<String>> {
    ctx.print_run(exec_str);

    let spawn_error = |error: String| ExecutionError::CommandFailed {
        command: exec_str.to_string(),
        error,
    };

    let (program, interpreter_args) = ctx
        .interpreter
        .split_first()
        .ok_or_else(|| spawn_error("no interpreter configured".to_string()))?;

    let mut command = StdCommand::new(program);
    command.args(interpreter_args);
    command.arg(exec_str);
    command.current_dir(&ctx.working_dir);

    let status = if ctx.console().is_capturing() {
        let output = command
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(e.to_string()))?;

        ctx.console()
            .forward_out(&output.stdout)
            .and_then(|_| ctx.console().forward_err(&output.stderr))
            .map_err(|e| write_fault(ctx, e))?;
        output.status
    } else {
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| spawn_error(e.to_string()))?
    };

    check_status(exec_str, status, ctx)?;
    Ok(None)
}

fn check_status(exec_str: &str, status: ExitStatus, ctx: &mut Context) -> CommandResult<()> {
    if status.success() {
        return Ok(());
    }

    if ctx.fail_on_exit_code {
        return Err(ExecutionError::NonZeroExit {
            command: exec_str.to_string(),
            code: status.code(),
        });
    }

    ctx.print_debug(&format!(
        "Command \"{}\" exited with {}, continuing",
        exec_str, status
    ));
    Ok(())
}

/// Delete a file relative to the working directory
///
/// A missing file is not an error.
pub fn delete_file(path: &str, ctx: &mut Context) -> CommandResult<Option<String>> {
    let target = ctx.working_dir.join(path);

    match fs::remove_file(&target) {
        Ok(()) => {
            ctx.print_debug(&format!("Deleted {}", target.display()));
            Ok(Some(format!("Deleted \"{}\"", path)))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            ctx.print_warn(&format!(
                "File \"{}\" does not exist, nothing to delete",
                target.display()
            ));
            Ok(None)
        }
        Err(e) => Err(ExecutionError::DeleteFailed {
            path: target,
            error: e.to_string(),
        }),
    }
}

/// Print a message on the output sink
pub fn echo(text: &str, ctx: &mut Context) -> CommandResult<Option<String>> {
    ctx.console()
        .println(text)
        .map_err(|e| write_fault(ctx, e))?;
    Ok(None)
}

fn write_fault(ctx: &Context, error: io::Error) -> ExecutionError {
    let task = ctx.current_task().map(String::as_str).unwrap_or_default();
    ExecutionError::internal(task, format!("failed to write output: {}", error))
}
