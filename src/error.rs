//! Error types for Taskr

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Taskr operations
pub type Result<T> = std::result::Result<T, TaskrError>;

/// Main error type for Taskr
#[derive(Error, Debug)]
pub enum TaskrError {
    /// Script discovery, loading and validation errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML serialization errors (script dumps)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Script file and static validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find script file (searched: {0})")]
    NotFound(String),

    #[error("Failed to read script file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{name}' is defined more than once (line {line})")]
    DuplicateTask { name: String, line: usize },

    #[error("Unknown command '{keyword}' in task '{task}' (line {line})")]
    UnknownCommand {
        task: String,
        keyword: String,
        line: usize,
    },

    #[error("Command '{keyword}' in task '{task}' expects {expected} argument(s), found {found} (line {line})")]
    Arity {
        task: String,
        keyword: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),
}

/// Failure categories surfaced on every failed `ExecutionResult`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TaskNotFound,
    UnknownCommand,
    CommandExecutionFault,
    FileDeleteFault,
    InternalFault,
    CyclicTaskInvocation,
    NonZeroExit,
}

/// Task execution errors
///
/// The `Display` text of each variant is the exact message placed on the
/// failed `ExecutionResult`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Task \"{0}\" not found")]
    TaskNotFound(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Failed to execute command \"{command}\": {error}")]
    CommandFailed { command: String, error: String },

    #[error("Command \"{command}\" exited with status {code:?}")]
    NonZeroExit { command: String, code: Option<i32> },

    #[error("Failed to delete \"{path}\": {error}")]
    DeleteFailed { path: PathBuf, error: String },

    #[error("Cyclic task invocation: {0}")]
    CyclicInvocation(String),

    #[error("Task \"{task}\" exceeds the maximum call depth of {max_depth}")]
    DepthExceeded { task: String, max_depth: usize },

    #[error("Error in task \"{task}\": {error}")]
    Internal { task: String, error: String },
}

impl ExecutionError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::TaskNotFound(_) => ErrorKind::TaskNotFound,
            ExecutionError::UnknownCommand(_) => ErrorKind::UnknownCommand,
            ExecutionError::CommandFailed { .. } => ErrorKind::CommandExecutionFault,
            ExecutionError::NonZeroExit { .. } => ErrorKind::NonZeroExit,
            ExecutionError::DeleteFailed { .. } => ErrorKind::FileDeleteFault,
            ExecutionError::CyclicInvocation(_) | ExecutionError::DepthExceeded { .. } => {
                ErrorKind::CyclicTaskInvocation
            }
            ExecutionError::Internal { .. } => ErrorKind::InternalFault,
        }
    }

    /// Wrap an unexpected fault raised while running `task`
    pub fn internal(task: &str, error: impl ToString) -> Self {
        ExecutionError::Internal {
            task: task.to_string(),
            error: error.to_string(),
        }
    }
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for command and task execution internals
pub type CommandResult<T> = std::result::Result<T, ExecutionError>;
