//! Typed error variants for resource operations.
//!
//! Internal resource code returns these variants; callers convert to
//! [`anyhow::Error`] via `?`.

use thiserror::Error;

/// Errors that arise from resource checks and apply operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A command invoked by a resource failed with a non-zero exit code.
    #[error("command '{program}' failed (exit {exit_code}): {stderr}")]
    ExecutionFailed {
        /// Name of the program that was invoked.
        program: String,
        /// Exit code returned by the process.
        exit_code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// A resource exists but is in an unexpected or inconsistent state.
    #[error("invalid state for '{resource}': {reason}")]
    InvalidState {
        /// Name or description of the resource in the invalid state.
        resource: String,
        /// Human-readable explanation of why the state is invalid.
        reason: String,
    },
}

impl ResourceError {
    /// Build an [`ExecutionFailed`](Self::ExecutionFailed) from a failed result.
    #[must_use]
    pub fn from_exec(program: &str, result: &crate::exec::ExecResult) -> Self {
        Self::ExecutionFailed {
            program: program.to_string(),
            exit_code: result.code.unwrap_or(-1),
            stderr: result.stderr.trim().to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::exec::ExecResult;

    #[test]
    fn execution_failed_display() {
        let e = ResourceError::ExecutionFailed {
            program: "stow".to_string(),
            exit_code: 2,
            stderr: "conflicts".to_string(),
        };
        assert_eq!(e.to_string(), "command 'stow' failed (exit 2): conflicts");
    }

    #[test]
    fn from_exec_trims_stderr() {
        let result = ExecResult {
            stdout: String::new(),
            stderr: "  boom \n".to_string(),
            success: false,
            code: None,
        };
        let e = ResourceError::from_exec("brew", &result);
        assert_eq!(e.to_string(), "command 'brew' failed (exit -1): boom");
    }

    #[test]
    fn invalid_state_display() {
        let e = ResourceError::InvalidState {
            resource: "~/.zshrc".to_string(),
            reason: "target is a directory".to_string(),
        };
        assert!(e.to_string().contains("~/.zshrc"));
        assert!(e.to_string().contains("target is a directory"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn resource_error_is_send_sync() {
        assert_send_sync::<ResourceError>();
        let _anyhow_err: anyhow::Error = ResourceError::InvalidState {
            resource: "x".to_string(),
            reason: "y".to_string(),
        }
        .into();
    }
}
