//! Output formatting and command-line path helpers.
//!
//! This module derives package names and archive paths from the arguments a
//! user typed, and renders the `locate` report for humans or scripts.

use crate::kit::Tool;
use crate::kit::search::{ToolLocation, ToolSource};
use crate::names::PackageIdentity;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::io::Write;

/// Publisher used when none is given and the model directory has no parent.
pub const DEFAULT_PUBLISHER: &str = "ModelPackager";

/// Writes a line to stderr, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Nothing sensible to do if stderr is gone.
    }
}

/// Chooses the raw package and publisher names for `model_dir`.
///
/// Explicit names win. Otherwise the package is named after the model
/// directory and the publisher after its parent, falling back to
/// [`DEFAULT_PUBLISHER`].
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use model_packager::output::infer_names;
///
/// let (package, publisher) = infer_names(Utf8Path::new("/models/microsoft/phi-3"), None, None);
/// assert_eq!(package, "phi-3");
/// assert_eq!(publisher, "microsoft");
/// ```
#[must_use]
pub fn infer_names(
    model_dir: &Utf8Path,
    name: Option<&str>,
    publisher: Option<&str>,
) -> (String, String) {
    let absolute = model_dir
        .canonicalize_utf8()
        .unwrap_or_else(|_| model_dir.to_owned());

    let package = name
        .map(str::to_owned)
        .or_else(|| absolute.file_name().map(str::to_owned))
        .unwrap_or_default();
    let publisher = publisher
        .map(str::to_owned)
        .or_else(|| {
            absolute
                .parent()
                .and_then(Utf8Path::file_name)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| DEFAULT_PUBLISHER.to_owned());

    (package, publisher)
}

/// Resolves the archive path the user asked for.
///
/// An existing directory, or a path without an extension, receives
/// `<publisher>_<package>.msix` inside it. Anything else is used as given.
#[must_use]
pub fn resolve_output_path(output: &Utf8Path, identity: &PackageIdentity) -> Utf8PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(identity.archive_file_name())
    } else {
        output.to_owned()
    }
}

/// One resolved tool in the `locate` report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocateReport {
    /// Executable file name.
    pub tool: &'static str,
    /// Program that would be run.
    pub program: String,
    /// Search tier that found it.
    pub source: ToolSource,
}

impl LocateReport {
    /// Builds a report entry from a resolved location.
    #[must_use]
    pub fn new(tool: Tool, location: &ToolLocation) -> Self {
        Self {
            tool: tool.file_name(),
            program: location.program.to_string(),
            source: location.source,
        }
    }

    /// Human-readable line for this entry.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!("{}: {} (via {})", self.tool, self.program, self.source)
    }
}

/// Renders report entries as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn locate_json(reports: &[LocateReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
