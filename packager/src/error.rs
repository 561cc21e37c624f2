//! Error types for the model packager.
//!
//! This module defines semantic error variants that describe why a packaging
//! run failed. Variants carry the paths and tool output needed to diagnose
//! the failure without re-running it.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while packaging a model directory.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// Packaging was requested on an operating system other than Windows.
    #[error("MSIX packaging is only supported on Windows (current platform: {os})")]
    UnsupportedPlatform {
        /// Name of the current operating system.
        os: String,
    },

    /// A package or publisher name is empty once sanitized.
    #[error("{field} name {value:?} contains no alphanumeric characters")]
    InvalidName {
        /// Which name was rejected (`package` or `publisher`).
        field: &'static str,
        /// The name as supplied by the caller.
        value: String,
    },

    /// The model directory does not exist.
    #[error("model directory {path} does not exist")]
    SourceNotFound {
        /// Path that was expected to hold the model files.
        path: Utf8PathBuf,
    },

    /// The model path exists but is not a directory.
    #[error("model path {path} is not a directory")]
    SourceNotDirectory {
        /// Path that was expected to be a directory.
        path: Utf8PathBuf,
    },

    /// Failed to prepare or populate the staging directory.
    #[error("staging failed: {reason}")]
    StagingFailed {
        /// Description of the staging failure.
        reason: String,
    },

    /// Failed to write the package manifest.
    #[error("failed to write manifest to {path}")]
    ManifestWrite {
        /// Path of the manifest file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The Windows Kits registry key could not be read.
    #[error("registry query failed: {reason}")]
    RegistryQuery {
        /// Description of why the query failed.
        reason: String,
    },

    /// An external tool could not be started.
    #[error("failed to run {tool}")]
    ToolInvocation {
        /// Program that was invoked.
        tool: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran but reported failure.
    #[error("{tool} exited with {status}: {stderr}\n{tool} output: {stdout}")]
    ToolFailed {
        /// Program that was invoked.
        tool: String,
        /// Exit status description.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
        /// Captured standard output, trimmed.
        stdout: String,
    },

    /// The signing certificate does not exist.
    #[error("certificate file {path} does not exist")]
    CertificateNotFound {
        /// Path of the missing certificate.
        path: Utf8PathBuf,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
