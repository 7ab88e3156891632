//! Outcome of running a command or a task

use crate::error::{ErrorKind, ExecutionError};

/// Success or failure of a command or task, with a human-readable message
///
/// This is the only channel through which the executor reports back; faults
/// are converted into a failed result close to where they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: Option<String>,
    /// Failure category, `None` on success
    pub kind: Option<ErrorKind>,
}

impl ExecutionResult {
    /// Successful result without a message
    pub fn ok() -> Self {
        ExecutionResult {
            success: true,
            message: None,
            kind: None,
        }
    }

    /// Successful result with a message
    pub fn ok_with(message: impl Into<String>) -> Self {
        ExecutionResult {
            success: true,
            message: Some(message.into()),
            kind: None,
        }
    }

    /// Failed result built from an execution error
    pub fn failure(error: &ExecutionError) -> Self {
        ExecutionResult {
            success: false,
            message: Some(error.to_string()),
            kind: Some(error.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Message text, or "" when there is none
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

impl From<ExecutionError> for ExecutionResult {
    fn from(error: ExecutionError) -> Self {
        ExecutionResult::failure(&error)
    }
}

impl From<Result<Option<String>, ExecutionError>> for ExecutionResult {
    fn from(result: Result<Option<String>, ExecutionError>) -> Self {
        match result {
            Ok(Some(message)) => ExecutionResult::ok_with(message),
            Ok(None) => ExecutionResult::ok(),
            Err(error) => error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_message_and_kind() {
        let result: ExecutionResult = ExecutionError::UnknownCommand("zap".to_string()).into();
        assert!(!result.success);
        assert_eq!(result.message(), "Unknown command: zap");
        assert_eq!(result.kind, Some(ErrorKind::UnknownCommand));
    }

    #[test]
    fn test_from_ok_result() {
        let result: ExecutionResult = Ok::<_, ExecutionError>(Some("done".to_string())).into();
        assert!(result.is_success());
        assert_eq!(result.message(), "done");
        assert_eq!(result.kind, None);

        let result: ExecutionResult = Ok::<_, ExecutionError>(None).into();
        assert_eq!(result, ExecutionResult::ok());
    }
}
