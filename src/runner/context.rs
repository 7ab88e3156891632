//! Execution context for task running
//!
//! The context tracks all the state needed during task execution that is not
//! part of the script itself: where commands run, how they are spawned, where
//! output goes and which tasks are currently on the call stack.

use colored::Colorize;
use std::env;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Default cap on nested `tsk` invocations
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Environment lookup used by `$env("NAME")` references
pub type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment
pub fn process_env() -> EnvLookup {
    Box::new(|name| env::var(name).ok())
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

/// Output sinks for command and diagnostic text
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    capture: bool,
}

impl Console {
    /// Write to the process stdout and stderr. Child processes inherit them.
    pub fn stdio() -> Self {
        Console {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            capture: false,
        }
    }

    /// Write to arbitrary sinks. Child process output is collected and
    /// forwarded to these sinks once the child exits.
    pub fn capture(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Console {
            out: Box::new(out),
            err: Box::new(err),
            capture: true,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capture
    }

    /// Print a line to the output sink
    pub fn println(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    /// Print a line to the error sink
    pub fn eprintln(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.err, "{}", text)?;
        self.err.flush()
    }

    /// Forward raw child stdout bytes
    pub fn forward_out(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.out.flush()
    }

    /// Forward raw child stderr bytes
    pub fn forward_err(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.err.write_all(bytes)?;
        self.err.flush()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}

/// In-memory sink that can be cloned and read back, for use with
/// [`Console::capture`]
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::other("capture buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Execution context that tracks state during task execution
pub struct Context {
    /// Directory commands run in and relative paths resolve against
    pub working_dir: PathBuf,

    /// Interpreter used for `run` commands (e.g., ["sh", "-c"])
    pub interpreter: Vec<String>,

    /// Stack of tasks being executed (for detecting recursion)
    pub task_stack: Vec<String>,

    /// Maximum depth of nested task invocations
    pub max_depth: usize,

    /// Treat a non-zero exit status of a `run` command as failure
    pub fail_on_exit_code: bool,

    /// Verbosity level
    pub verbosity: Verbosity,

    env: EnvLookup,
    console: Console,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            interpreter: default_interpreter(),
            task_stack: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            fail_on_exit_code: false,
            verbosity: Verbosity::Normal,
            env: process_env(),
            console: Console::stdio(),
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        if !interpreter.is_empty() {
            self.interpreter = interpreter;
        }
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Fail `run` commands that exit with a non-zero status
    pub fn with_fail_on_exit_code(mut self, enabled: bool) -> Self {
        self.fail_on_exit_code = enabled;
        self
    }

    /// Cap nested task invocations
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Replace the environment lookup
    pub fn with_env_lookup(mut self, lookup: EnvLookup) -> Self {
        self.env = lookup;
        self
    }

    /// Replace the output sinks
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Look up an environment variable through the configured lookup
    pub fn env_var(&self, name: &str) -> Option<String> {
        (self.env)(name)
    }

    /// The configured environment lookup
    pub fn env_lookup(&self) -> &(dyn Fn(&str) -> Option<String> + Send + Sync) {
        &*self.env
    }

    pub fn console(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Push a task onto the execution stack
    pub fn push_task(&mut self, task_name: String) {
        self.task_stack.push(task_name);
    }

    /// Pop a task from the execution stack
    pub fn pop_task(&mut self) -> Option<String> {
        self.task_stack.pop()
    }

    /// Check if a task is in the execution stack (detect recursion)
    pub fn is_task_in_stack(&self, task_name: &str) -> bool {
        self.task_stack.iter().any(|t| t == task_name)
    }

    /// Get the current task name (top of stack)
    pub fn current_task(&self) -> Option<&String> {
        self.task_stack.last()
    }

    /// Print info message
    pub fn print_info(&mut self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            self.diagnostic(format!("{} {}", "[INFO]".green(), message));
        }
    }

    /// Print the command line about to run
    pub fn print_run(&mut self, command: &str) {
        if self.verbosity >= Verbosity::Normal {
            self.diagnostic(format!("{} {}", "[RUN]".cyan(), command));
        }
    }

    /// Print warning message
    pub fn print_warn(&mut self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            self.diagnostic(format!("{} {}", "[WARN]".yellow(), message));
        }
    }

    /// Print error message
    pub fn print_error(&mut self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            self.diagnostic(format!("{} {}", "[ERROR]".red(), message));
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&mut self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            self.diagnostic(format!("{} {}", "[DEBUG]".dimmed(), message));
        }
    }

    // Write failures on diagnostics are ignored.
    fn diagnostic(&mut self, line: String) {
        let _ = self.console.eprintln(&line);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("working_dir", &self.working_dir)
            .field("interpreter", &self.interpreter)
            .field("task_stack", &self.task_stack)
            .field("max_depth", &self.max_depth)
            .field("fail_on_exit_code", &self.fail_on_exit_code)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

#[cfg(windows)]
fn default_interpreter() -> Vec<String> {
    vec!["cmd".to_string(), "/C".to_string()]
}

#[cfg(not(windows))]
fn default_interpreter() -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = Context::new();
        assert_eq!(ctx.verbosity, Verbosity::Normal);
        assert_eq!(ctx.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!ctx.fail_on_exit_code);
        assert!(ctx.task_stack.is_empty());
    }

    #[test]
    fn test_task_stack() {
        let mut ctx = Context::new();

        assert!(!ctx.is_task_in_stack("task1"));

        ctx.push_task("task1".to_string());
        ctx.push_task("task2".to_string());
        assert!(ctx.is_task_in_stack("task1"));
        assert_eq!(ctx.current_task(), Some(&"task2".to_string()));

        assert_eq!(ctx.pop_task(), Some("task2".to_string()));
        assert!(!ctx.is_task_in_stack("task2"));
        assert_eq!(ctx.current_task(), Some(&"task1".to_string()));
    }

    #[test]
    fn test_injected_env_lookup() {
        let ctx = Context::new().with_env_lookup(Box::new(|name| {
            (name == "FOO").then(|| "bar".to_string())
        }));
        assert_eq!(ctx.env_var("FOO"), Some("bar".to_string()));
        assert_eq!(ctx.env_var("OTHER"), None);
    }

    #[test]
    fn test_empty_interpreter_is_ignored() {
        let ctx = Context::new().with_interpreter(Vec::new());
        assert!(!ctx.interpreter.is_empty());
    }

    #[test]
    fn test_diagnostics_respect_verbosity() {
        let err = SharedBuffer::new();
        let mut ctx = Context::new()
            .with_verbosity(Verbosity::Quiet)
            .with_console(Console::capture(SharedBuffer::new(), err.clone()));

        ctx.print_info("hidden info");
        ctx.print_debug("hidden debug");
        ctx.print_warn("shown warning");

        let text = err.contents();
        assert!(!text.contains("hidden"));
        assert!(text.contains("shown warning"));
    }

    #[test]
    fn test_verbosity_levels() {
        assert!(Verbosity::Verbose > Verbosity::Normal);
        assert!(Verbosity::Normal > Verbosity::Quiet);
        assert!(Verbosity::Quiet > Verbosity::Silent);
    }
}
