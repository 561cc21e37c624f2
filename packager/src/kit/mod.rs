//! Windows SDK ("Windows Kits") discovery.
//!
//! `makeappx.exe` and `signtool.exe` ship with the Windows SDK, which may be
//! installed in several layouts. This module finds them.
//!
//! # Sub-modules
//!
//! - [`registry`] - `KitsRoot10` lookup through `reg.exe`.
//! - [`search`] - The ordered fallback search that resolves a [`Tool`].

pub mod registry;
pub mod search;

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use std::cmp::Ordering;
use std::fmt;

/// Architecture directory the tools are taken from.
pub const ARCH_DIR: &str = "x64";

/// An SDK executable the packager runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// The MSIX packaging tool.
    MakeAppx,
    /// The Authenticode signing tool.
    SignTool,
}

impl Tool {
    /// The executable's file name.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::MakeAppx => "makeappx.exe",
            Self::SignTool => "signtool.exe",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A Windows 10+ SDK version such as `10.0.22621.0`.
///
/// Versions order numerically, so `10.0.22621.0` sorts above `10.0.9200.0`.
///
/// # Examples
///
/// ```
/// use model_packager::kit::KitVersion;
///
/// let newer = KitVersion::parse("10.0.22621.0").expect("valid version");
/// let older = KitVersion::parse("10.0.9200.0").expect("valid version");
/// assert!(newer > older);
/// assert!(KitVersion::parse("8.1").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KitVersion {
    parts: Vec<u64>,
    raw: String,
}

impl KitVersion {
    /// Parses a dotted numeric version starting with `10.`.
    ///
    /// Returns `None` for anything else, including registry subkeys that are
    /// not SDK versions.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if !raw.starts_with("10.") {
            return None;
        }
        let parts = raw
            .split('.')
            .map(str::parse)
            .collect::<std::result::Result<Vec<u64>, _>>()
            .ok()?;
        Some(Self {
            parts,
            raw: raw.to_owned(),
        })
    }

    /// Return the version as it appeared in the registry.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for KitVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts
            .cmp(&other.parts)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for KitVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for KitVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// An SDK installation as registered on the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledKit {
    root: Utf8PathBuf,
    versions: Vec<KitVersion>,
}

impl InstalledKit {
    /// Creates a kit description; versions are sorted newest first.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, mut versions: Vec<KitVersion>) -> Self {
        versions.sort_by(|a, b| b.cmp(a));
        versions.dedup();
        Self {
            root: root.into(),
            versions,
        }
    }

    /// The kit root, for example `C:\Program Files (x86)\Windows Kits\10\`.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Registered versions, newest first.
    #[must_use]
    pub fn versions(&self) -> &[KitVersion] {
        &self.versions
    }

    /// Candidate paths for `tool`, in priority order.
    ///
    /// Each version's `bin\<version>\x64` directory comes first, newest
    /// version first, followed by the unversioned `bin\x64` directory.
    #[must_use]
    pub fn candidates(&self, tool: Tool) -> Vec<Utf8PathBuf> {
        let bin = self.root.join("bin");
        self.versions
            .iter()
            .map(|version| bin.join(version.as_str()).join(ARCH_DIR))
            .chain(std::iter::once(bin.join(ARCH_DIR)))
            .map(|dir| dir.join(tool.file_name()))
            .collect()
    }
}

/// Source of the installed SDK description.
///
/// The production implementation reads the Windows registry; tests supply a
/// fixed kit or a failure.
#[cfg_attr(test, mockall::automock)]
pub trait KitLocator {
    /// Looks up the installed SDK root and its registered versions.
    ///
    /// # Errors
    ///
    /// Returns an error when the lookup mechanism is unavailable, the key or
    /// value is missing, or the OS reports a failure.
    fn installed_kit(&self) -> Result<InstalledKit>;
}

/// A [`KitLocator`] that always answers with the same kit.
#[derive(Debug, Clone)]
pub struct FixedKitLocator(pub InstalledKit);

impl KitLocator for FixedKitLocator {
    fn installed_kit(&self) -> Result<InstalledKit> {
        Ok(self.0.clone())
    }
}
