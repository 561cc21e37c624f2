//! Shared test utilities for the packager crate.

use crate::error::{PackagerError, Result};
use crate::executor::CommandExecutor;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a successful command `Output` with the given stdout.
#[must_use]
pub fn stdout_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` (exit code 1) with the given stderr.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program the packager is expected to run.
    pub cmd: String,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
    /// Bytes written to the path following `/p`, imitating `makeappx pack`.
    pub archive: Option<Vec<u8>>,
}

impl ExpectedCall {
    /// Expects `cmd` to be run and answers with `result`.
    pub fn new(cmd: impl Into<String>, result: Result<Output>) -> Self {
        Self {
            cmd: cmd.into(),
            result,
            archive: None,
        }
    }

    /// Writes `contents` to the archive path when the call is made.
    #[must_use]
    pub fn writing_archive(mut self, contents: &[u8]) -> Self {
        self.archive = Some(contents.to_vec());
        self
    }
}

/// A command invocation observed by [`StubExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program that was run.
    pub cmd: String,
    /// Arguments it was given.
    pub args: Vec<String>,
}

impl RecordedCall {
    /// Returns the argument following `flag`, if any.
    #[must_use]
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(String::as_str)
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Answers invocations from a queue of [`ExpectedCall`]s and records every
/// call, so tests can inspect arguments such as the staging directory that are
/// only known at run time.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Returns every invocation received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let recorded = RecordedCall {
            cmd: cmd.to_owned(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
        };
        self.calls.borrow_mut().push(recorded.clone());

        let call = self.expected.borrow_mut().pop_front().ok_or_else(|| {
            PackagerError::StubMismatch {
                message: format!("unexpected invocation of {cmd}"),
            }
        })?;

        if call.cmd != cmd {
            return Err(PackagerError::StubMismatch {
                message: format!("expected {}, got {cmd}", call.cmd),
            });
        }

        if let (Some(contents), Some(path)) = (&call.archive, recorded.flag_value("/p")) {
            std::fs::write(path, contents)?;
        }

        call.result
    }
}
