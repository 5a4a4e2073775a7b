//! Idempotent resource primitives (check + apply pattern).
pub mod alias;
pub mod brew;
pub mod dock_item;
pub mod error;
pub mod fs;
pub mod preference;
pub mod profile_line;
pub mod stow;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// a failing external command, or other system errors.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource (symlink, preference, Dock item, ...).
///
/// # Examples
///
/// ```
/// use provision_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "dot-gitconfig.work".into() };
/// let skip = ResourceState::Invalid { reason: "regular file at alias path".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g., a regular file occupies an alias path).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use provision_cli::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
/// let skipped = ResourceChange::Skipped { reason: "dockutil not installed".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Unified interface for resources that can be checked and applied.
///
/// ```ignore
/// let state = resource.current_state()?;
/// if resource.needs_change()? {
///     resource.apply()?;
/// }
/// ```
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from `current_state()`.
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

/// Shared test helpers for resource and task unit tests.
#[cfg(test)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// One scripted executor response.
    #[derive(Debug, Clone)]
    pub struct Reply {
        /// Exit status.
        pub success: bool,
        /// Captured stdout.
        pub stdout: String,
        /// Captured stderr.
        pub stderr: String,
    }

    impl Reply {
        /// Successful reply with `stdout`.
        #[must_use]
        pub fn ok(stdout: &str) -> Self {
            Self {
                success: true,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }
        }

        /// Failed reply with empty output.
        #[must_use]
        pub fn fail() -> Self {
            Self {
                success: false,
                stdout: String::new(),
                stderr: String::new(),
            }
        }

        /// Reply carrying `stderr`, as Stow reports its plan on stderr.
        #[must_use]
        pub fn stderr(success: bool, stderr: &str) -> Self {
            Self {
                success,
                stdout: String::new(),
                stderr: stderr.to_string(),
            }
        }
    }

    /// A configurable mock executor.
    ///
    /// Maintains a queue of [`Reply`] values consumed in FIFO order. When the
    /// queue is empty any call returns a failed response with stdout
    /// `"unexpected call"`. Every call is recorded as a space-joined command
    /// line, readable through [`calls`](Self::calls).
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        replies: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<String>>,
        /// Programs reported as present by `which`/`locate`.
        present: Vec<String>,
    }

    impl MockExecutor {
        /// Create a mock with a single successful response.
        #[must_use]
        pub fn ok(stdout: &str) -> Self {
            Self::with_replies(vec![Reply::ok(stdout)])
        }

        /// Create a mock with a single failed response (empty stdout).
        #[must_use]
        pub fn fail() -> Self {
            Self::with_replies(vec![Reply::fail()])
        }

        /// Create a mock from an ordered list of `(success, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(bool, String)>) -> Self {
            Self::with_replies(
                responses
                    .into_iter()
                    .map(|(success, stdout)| Reply {
                        success,
                        stdout,
                        stderr: String::new(),
                    })
                    .collect(),
            )
        }

        /// Create a mock from an ordered list of replies.
        #[must_use]
        pub fn with_replies(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Self::default()
            }
        }

        /// Report `program` as installed at `/usr/local/bin/<program>`.
        #[must_use]
        pub fn with_program(mut self, program: &str) -> Self {
            self.present.push(program.to_string());
            self
        }

        /// Whether `program` was registered with [`with_program`](Self::with_program).
        #[must_use]
        pub fn which(&self, program: &str) -> bool {
            self.present.iter().any(|p| p == program)
        }

        /// Command lines issued so far.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        /// Total number of executor calls made so far.
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.calls().len()
        }

        fn next(&self, program: &str, args: &[&str]) -> Reply {
            if let Ok(mut calls) = self.calls.lock() {
                let mut line = program.to_string();
                for arg in args {
                    line.push(' ');
                    line.push_str(arg);
                }
                calls.push(line);
            }
            self.replies.lock().map_or_else(
                |_| Reply::fail(),
                |mut guard| {
                    guard.pop_front().unwrap_or_else(|| Reply {
                        success: false,
                        stdout: "unexpected call".to_string(),
                        stderr: String::new(),
                    })
                },
            )
        }

        fn checked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let reply = self.next(program, args);
            if reply.success {
                Ok(to_result(reply))
            } else {
                anyhow::bail!("mock command failed: {program}")
            }
        }
    }

    fn to_result(reply: Reply) -> ExecResult {
        ExecResult {
            code: Some(i32::from(!reply.success)),
            stdout: reply.stdout,
            stderr: reply.stderr,
            success: reply.success,
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.checked(program, args)
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            Ok(to_result(self.next(program, args)))
        }

        fn run_interactive(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            Ok(to_result(self.next(program, args)))
        }

        fn locate(&self, program: &str) -> Option<PathBuf> {
            self.which(program)
                .then(|| PathBuf::from("/usr/local/bin").join(program))
        }
    }
}
