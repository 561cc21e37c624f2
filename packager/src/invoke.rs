//! Running the SDK tools against a staging directory.

use crate::error::Result;
use crate::executor::{CommandExecutor, display_command, require_success};
use crate::kit::search::{SearchConfig, ToolLocation, resolve_tool};
use crate::kit::{KitLocator, Tool};
use crate::platform::Platform;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, error, info};
use std::fs;
use std::process::Output;

/// Placeholder shown in logs instead of secret arguments.
pub(crate) const REDACTED: &str = "********";

/// Locates and runs SDK executables.
///
/// Each run resolves its tool afresh, so an SDK installed mid-session is
/// picked up by the next run.
pub struct SdkTools<'a> {
    executor: &'a dyn CommandExecutor,
    locator: &'a dyn KitLocator,
    search: SearchConfig,
}

impl<'a> SdkTools<'a> {
    /// Creates a tool runner from its collaborators.
    #[must_use]
    pub fn new(
        executor: &'a dyn CommandExecutor,
        locator: &'a dyn KitLocator,
        search: SearchConfig,
    ) -> Self {
        Self {
            executor,
            locator,
            search,
        }
    }

    /// Resolves `tool` without running it.
    #[must_use]
    pub fn locate(&self, tool: Tool) -> ToolLocation {
        resolve_tool(tool, self.locator, &self.search)
    }

    /// Runs `tool` with `args` and requires a zero exit status.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PackagerError::ToolInvocation`] if the tool
    /// cannot be started, or [`crate::error::PackagerError::ToolFailed`] with
    /// both captured streams if it exits non-zero.
    pub fn run(&self, tool: Tool, args: &[&str]) -> Result<Output> {
        self.run_redacted(tool, args, None)
    }

    /// Like [`SdkTools::run`], but hides `secret` in logged command lines.
    ///
    /// # Errors
    ///
    /// As for [`SdkTools::run`].
    pub fn run_redacted(&self, tool: Tool, args: &[&str], secret: Option<&str>) -> Result<Output> {
        let location = self.locate(tool);
        let program = location.program.as_str();
        let shown: Vec<&str> = args
            .iter()
            .map(|arg| if Some(*arg) == secret { REDACTED } else { *arg })
            .collect();
        info!("running {}", display_command(program, &shown));

        let output = self.executor.run(program, args)?;
        let output = require_success(program, output)?;
        debug!("{tool} finished: {}", String::from_utf8_lossy(&output.stdout).trim());
        Ok(output)
    }
}

/// Packs `staging_dir` into the archive at `output`.
///
/// Any existing file at `output` is deleted and its parent directory created
/// before `makeappx.exe pack /d <staging_dir> /p <output>` runs.
///
/// # Errors
///
/// Returns an I/O error if the output location cannot be prepared, or the
/// tool errors described on [`SdkTools::run`].
pub fn try_invoke_packager(
    tools: &SdkTools<'_>,
    staging_dir: &Utf8Path,
    output: &Utf8Path,
) -> Result<Utf8PathBuf> {
    prepare_output(output)?;
    tools.run(
        Tool::MakeAppx,
        &["pack", "/d", staging_dir.as_str(), "/p", output.as_str()],
    )?;
    info!("created package {output}");
    Ok(output.to_owned())
}

/// Packs `staging_dir` into `output`, logging instead of returning errors.
///
/// Returns `None` straight away on platforms other than Windows, and on any
/// failure to locate or run the tool. A non-zero exit is logged with the
/// tool's stderr and stdout.
pub fn invoke_packager(
    platform: Platform,
    tools: &SdkTools<'_>,
    staging_dir: &Utf8Path,
    output: &Utf8Path,
) -> Option<Utf8PathBuf> {
    let result = platform
        .ensure_supported()
        .and_then(|()| try_invoke_packager(tools, staging_dir, output));
    match result {
        Ok(path) => Some(path),
        Err(e) => {
            error!("packaging failed: {e}");
            None
        }
    }
}

fn prepare_output(output: &Utf8Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if output.exists() {
        debug!("removing existing package {output}");
        fs::remove_file(output)?;
    }
    Ok(())
}
