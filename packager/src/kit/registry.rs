//! Windows registry lookup of the installed SDK.
//!
//! The SDK installer records its root under
//! `HKLM\SOFTWARE\Microsoft\Windows Kits\Installed Roots` as `KitsRoot10`,
//! with one subkey per installed version. The key is read through `reg.exe`
//! so the lookup runs through the same [`CommandExecutor`] as every other
//! tool.

use super::{InstalledKit, KitLocator, KitVersion};
use crate::error::{PackagerError, Result};
use crate::executor::{CommandExecutor, display_command};
use log::{debug, trace};
use std::process::Output;

/// Registry key holding the SDK installation roots.
pub const INSTALLED_ROOTS_KEY: &str =
    r"HKEY_LOCAL_MACHINE\SOFTWARE\Microsoft\Windows Kits\Installed Roots";

/// Value naming the Windows 10+ SDK root.
pub const KITS_ROOT_VALUE: &str = "KitsRoot10";

const REG_PROGRAM: &str = "reg.exe";

/// String value types `reg query` prints before the data.
const STRING_TYPES: [&str; 2] = ["REG_EXPAND_SZ", "REG_SZ"];

/// Reads the installed SDK from the registry via `reg.exe query`.
pub struct RegistryKitLocator<'a> {
    executor: &'a dyn CommandExecutor,
}

impl<'a> RegistryKitLocator<'a> {
    /// Creates a locator that runs `reg.exe` through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self { executor }
    }

    fn query(&self, args: &[&str]) -> Result<String> {
        trace!("querying registry: {}", display_command(REG_PROGRAM, args));
        let output = self
            .executor
            .run(REG_PROGRAM, args)
            .map_err(|e| PackagerError::RegistryQuery {
                reason: e.to_string(),
            })?;
        stdout_if_success(output)
    }
}

impl KitLocator for RegistryKitLocator<'_> {
    fn installed_kit(&self) -> Result<InstalledKit> {
        let root_listing = self.query(&["query", INSTALLED_ROOTS_KEY, "/v", KITS_ROOT_VALUE])?;
        let root = parse_string_value(&root_listing, KITS_ROOT_VALUE).ok_or_else(|| {
            PackagerError::RegistryQuery {
                reason: format!("{KITS_ROOT_VALUE} is not set under {INSTALLED_ROOTS_KEY}"),
            }
        })?;

        let key_listing = self.query(&["query", INSTALLED_ROOTS_KEY])?;
        let versions = parse_version_subkeys(&key_listing);
        debug!(
            "registry lists SDK root {root} with {} version(s)",
            versions.len()
        );

        Ok(InstalledKit::new(root, versions))
    }
}

/// Returns the listing printed by a successful `reg query`.
///
/// `reg.exe` prints in the console code page; output that is not valid
/// UTF-8 counts as a failed lookup.
fn stdout_if_success(output: Output) -> Result<String> {
    if output.status.success() {
        return String::from_utf8(output.stdout).map_err(|e| PackagerError::RegistryQuery {
            reason: format!("reg query printed non-UTF-8 output: {e}"),
        });
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(PackagerError::RegistryQuery {
        reason: format!("reg query exited with {}: {}", output.status, stderr.trim()),
    })
}

/// Extracts the data of string value `name` from `reg query` output.
///
/// Value lines are indented and take the form `<name>    REG_SZ    <data>`.
#[must_use]
pub fn parse_string_value(listing: &str, name: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix(name)?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = rest.trim_start();
        let data = STRING_TYPES
            .iter()
            .find_map(|kind| rest.strip_prefix(kind))?
            .trim();
        (!data.is_empty()).then(|| data.to_owned())
    })
}

/// Collects SDK versions from the subkey lines of `reg query` output.
///
/// Subkeys are printed unindented as full key paths; only those whose last
/// component is a Windows 10+ version are kept.
#[must_use]
pub fn parse_version_subkeys(listing: &str) -> Vec<KitVersion> {
    listing
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with(char::is_whitespace))
        .filter_map(|line| line.trim_end().rsplit('\\').next())
        .filter_map(KitVersion::parse)
        .collect()
}
