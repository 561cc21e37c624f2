//! Model packager library.
//!
//! This crate packages a directory of model files into an MSIX archive. It
//! stages the files, generates the package manifest and placeholder logos,
//! and drives `makeappx.exe` (and optionally `signtool.exe`) from the Windows
//! SDK. It is used by the `model-packager` CLI binary and can be consumed
//! programmatically.
//!
//! # Modules
//!
//! - [`assets`] - Placeholder logo images
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Semantic error types
//! - [`executor`] - External command execution
//! - [`invoke`] - Running `makeappx.exe` against a staging directory
//! - [`kit`] - Windows SDK discovery
//! - [`manifest`] - `AppxManifest.xml` generation
//! - [`names`] - Package and publisher name sanitization
//! - [`output`] - CLI path helpers and report formatting
//! - [`pipeline`] - End-to-end packaging orchestration
//! - [`platform`] - Host platform detection
//! - [`signing`] - Package signing with `signtool.exe`
//! - [`staging`] - Staging directory lifecycle and file copying

pub mod assets;
pub mod cli;
pub mod error;
pub mod executor;
pub mod invoke;
pub mod kit;
pub mod manifest;
pub mod names;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod signing;
pub mod staging;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
