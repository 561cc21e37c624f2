//! External command execution.
//!
//! Every child process the packager starts (`reg.exe`, `makeappx.exe`,
//! `signtool.exe`) goes through [`CommandExecutor`], so tests can script the
//! results instead of touching the host.

use crate::error::{PackagerError, Result};
use std::process::{Command, Output};

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// A non-zero exit status is not an error; callers inspect
    /// [`Output::status`] themselves.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::ToolInvocation`] when the process cannot be
    /// spawned, for example when the program is not on the search path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use model_packager::executor::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run("makeappx.exe", &["/?"])?;
    /// println!("{}", String::from_utf8_lossy(&output.stdout));
    /// # Ok::<(), model_packager::error::PackagerError>(())
    /// ```
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output>;
}

/// Executes commands on the host system, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        Command::new(cmd)
            .args(args)
            .output()
            .map_err(|source| PackagerError::ToolInvocation {
                tool: cmd.to_owned(),
                source,
            })
    }
}

/// Converts a failed [`Output`] into [`PackagerError::ToolFailed`].
///
/// Returns `Ok(output)` unchanged when the process exited successfully.
///
/// # Errors
///
/// Returns [`PackagerError::ToolFailed`] carrying both captured streams when
/// the exit status is non-zero.
pub fn require_success(tool: &str, output: Output) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }

    Err(PackagerError::ToolFailed {
        tool: tool.to_owned(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_owned(),
    })
}

/// Renders a command line for log messages.
pub(crate) fn display_command(cmd: &str, args: &[&str]) -> String {
    std::iter::once(cmd)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
