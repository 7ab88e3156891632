//! Task execution
//!
//! The executor walks a task's commands in order, resolves references in
//! their arguments and dispatches each one by kind. Nested `tsk` invocations
//! share the named arguments and runtime variables of the whole invocation.

use crate::error::{CommandResult, ExecutionError};
use crate::runner::{
    delete_file, echo, interpolate, run_shell, Context, ExecutionResult, Scope,
};
use crate::script::{Command, CommandKind, Script};
use std::collections::HashMap;
use std::sync::Arc;

/// Runs tasks of one parsed script
pub struct Executor {
    script: Arc<Script>,

    /// Script-level declarations, later declarations winning
    declared: HashMap<String, String>,

    /// Positional arguments keyed by task name
    task_args: HashMap<String, Vec<String>>,

    /// Named arguments shared by every task of the invocation
    named_args: HashMap<String, String>,

    /// Variables assigned by `var` commands
    vars: HashMap<String, String>,

    ctx: Context,
}

impl Executor {
    /// Create an executor running in the current directory
    pub fn new(script: Script) -> Self {
        Self::with_context(script, Context::new())
    }

    /// Create an executor with an explicit context
    pub fn with_context(script: Script, ctx: Context) -> Self {
        Executor {
            declared: script.declared_vars(),
            script: Arc::new(script),
            task_args: HashMap::new(),
            named_args: HashMap::new(),
            vars: HashMap::new(),
            ctx,
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Register the positional arguments (`?1`, `?2`, ...) of a task
    pub fn set_task_args(&mut self, task_name: impl Into<String>, args: Vec<String>) {
        self.task_args.insert(task_name.into(), args);
    }

    /// Replace the named arguments (`?key`) of the invocation
    pub fn set_named_args(&mut self, args: HashMap<String, String>) {
        self.named_args = args;
    }

    /// Set a runtime variable, as a `var` command would
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Get a runtime variable
    pub fn get_var(&self, name: &str) -> Option<&String> {
        self.vars.get(name)
    }

    /// Resolve all references in `text` as seen from `task_name`
    pub fn resolve(&self, task_name: &str, text: &str) -> String {
        let positional = self
            .task_args
            .get(task_name)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let scope = Scope {
            positional,
            named: &self.named_args,
            declared: &self.declared,
            runtime: &self.vars,
            env: self.ctx.env_lookup(),
        };
        interpolate(text, &scope)
    }

    /// Run a task by name
    ///
    /// Commands run in order; the first failure stops the task and is
    /// returned as is.
    pub fn execute_task(&mut self, name: &str) -> ExecutionResult {
        let script = Arc::clone(&self.script);
        let Some(task) = script.find_task(name) else {
            return ExecutionError::TaskNotFound(name.to_string()).into();
        };

        if let Err(e) = self.enter_task(name) {
            return e.into();
        }
        self.ctx.print_info(&format!("Running task: {}", name));

        let failure = task
            .commands
            .iter()
            .map(|command| self.execute_command(name, command))
            .find(|result| !result.success);

        self.ctx.pop_task();

        match failure {
            Some(result) => result,
            None => {
                self.ctx.print_debug(&format!("Task completed: {}", name));
                ExecutionResult::ok_with(format!("Task \"{}\" completed successfully", name))
            }
        }
    }

    /// Run one command on behalf of `task_name`
    pub fn execute_command(&mut self, task_name: &str, command: &Command) -> ExecutionResult {
        let Some(kind) = command.kind() else {
            return ExecutionError::UnknownCommand(command.name.clone()).into();
        };

        let args = match self.resolve_args(task_name, command, kind) {
            Ok(args) => args,
            Err(e) => return e.into(),
        };

        match kind {
            CommandKind::Run => run_shell(&args[0], &mut self.ctx).into(),
            CommandKind::Del => delete_file(&args[0], &mut self.ctx).into(),
            CommandKind::Ech => echo(&args[0], &mut self.ctx).into(),
            CommandKind::Tsk => self.invoke_subtask(&args[0]),
            CommandKind::Var => {
                let (name, value) = (&args[0], &args[1]);
                self.ctx.print_debug(&format!("Set ${} = \"{}\"", name, value));
                self.set_var(name.as_str(), value.as_str());
                ExecutionResult::ok()
            }
        }
    }

    /// Resolve the arguments a command consumes. The name operand of `var`
    /// is taken literally.
    fn resolve_args(
        &mut self,
        task_name: &str,
        command: &Command,
        kind: CommandKind,
    ) -> CommandResult<Vec<String>> {
        let arity = kind.arity();
        if command.args.len() < arity {
            return Err(ExecutionError::internal(
                task_name,
                format!(
                    "command '{}' expects {} argument(s), found {}",
                    command.name,
                    arity,
                    command.args.len()
                ),
            ));
        }
        if command.args.len() > arity {
            self.ctx.print_debug(&format!(
                "Ignoring extra arguments of '{}' command",
                command.name
            ));
        }

        Ok(match kind {
            CommandKind::Var => vec![
                command.args[0].clone(),
                self.resolve(task_name, &command.args[1]),
            ],
            _ => vec![self.resolve(task_name, &command.args[0])],
        })
    }

    fn invoke_subtask(&mut self, target: &str) -> ExecutionResult {
        let result = self.execute_task(target);
        if !result.success {
            return result;
        }
        ExecutionResult::ok_with(format!("Subtask \"{}\" finished", target))
    }

    /// Push `name` on the call stack unless that would recurse
    fn enter_task(&mut self, name: &str) -> CommandResult<()> {
        if self.ctx.is_task_in_stack(name) {
            let mut path = self.ctx.task_stack.clone();
            path.push(name.to_string());
            return Err(ExecutionError::CyclicInvocation(path.join(" -> ")));
        }

        if self.ctx.task_stack.len() >= self.ctx.max_depth {
            return Err(ExecutionError::DepthExceeded {
                task: name.to_string(),
                max_depth: self.ctx.max_depth,
            });
        }

        self.ctx.push_task(name.to_string());
        Ok(())
    }
}
