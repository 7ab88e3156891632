//! Taskr - a tiny task automation language
//!
//! A Taskrfile declares global variables and named tasks made of simple
//! commands. The [`script`] module parses that text into a [`Script`]; the
//! [`runner`] module executes tasks, substituting arguments and variables
//! into each command before it runs.
//!
//! ```text
//! var GREETING = "hello"
//!
//! task greet:
//!     ech "$GREETING ?1"
//!     run "echo built with $env("USER")"
//! ```
//!
//! # Library usage
//!
//! ```rust,no_run
//! use taskr::{Executor, Parser};
//!
//! let script = Parser::parse("task greet:\n    ech \"hello ?1\"\n");
//! let mut executor = Executor::new(script);
//! executor.set_task_args("greet", vec!["world".to_string()]);
//! let result = executor.execute_task("greet");
//! assert!(result.success);
//! ```

// Public modules
pub mod cli;
pub mod error;
pub mod runner;
pub mod script;

// Re-export commonly used types
pub use error::{ErrorKind, Result, TaskrError};
pub use runner::{Context, ExecutionResult, Executor};
pub use script::{Parser, Script};

/// Current version of Taskr
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
