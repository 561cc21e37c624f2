//! Ordered search for SDK executables.
//!
//! Resolution tries, in order: the registered SDK, the well-known install
//! paths (only when the registry cannot be read), a recursive walk of
//! `WindowsSdkDir`, and finally the bare program name for the process search
//! path. Nothing is cached; every call searches afresh.

use super::{ARCH_DIR, KitLocator, Tool};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};
use serde::Serialize;
use std::fmt;
use walkdir::WalkDir;

/// Environment variable naming an SDK root for the last-resort search.
pub const SDK_DIR_ENV: &str = "WindowsSdkDir";

/// Default `bin` directory of a Windows 10 SDK installation.
pub const DEFAULT_KITS_BIN: &str = r"C:\Program Files (x86)\Windows Kits\10\bin";

/// SDK versions probed under [`DEFAULT_KITS_BIN`], newest first.
pub const WELL_KNOWN_VERSIONS: [&str; 4] =
    ["10.0.22621.0", "10.0.19041.0", "10.0.18362.0", "10.0.17763.0"];

/// Inputs to the non-registry search tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Directories probed when the registry lookup fails, in priority order.
    pub well_known_dirs: Vec<Utf8PathBuf>,
    /// SDK root walked for `x64` directories holding the tool.
    pub sdk_dir: Option<Utf8PathBuf>,
}

impl SearchConfig {
    /// Builds the default configuration, reading [`SDK_DIR_ENV`].
    ///
    /// An unset or empty variable disables the SDK directory tier.
    #[must_use]
    pub fn from_env() -> Self {
        let sdk_dir = std::env::var(SDK_DIR_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(Utf8PathBuf::from);
        Self {
            sdk_dir,
            ..Self::default()
        }
    }

    /// The standard versioned `x64` directories followed by the unversioned
    /// one.
    #[must_use]
    pub fn default_well_known_dirs() -> Vec<Utf8PathBuf> {
        let bin = Utf8Path::new(DEFAULT_KITS_BIN);
        WELL_KNOWN_VERSIONS
            .iter()
            .map(|version| bin.join(version).join(ARCH_DIR))
            .chain(std::iter::once(bin.join(ARCH_DIR)))
            .collect()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            well_known_dirs: Self::default_well_known_dirs(),
            sdk_dir: None,
        }
    }
}

/// The search tier that produced a [`ToolLocation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolSource {
    /// Found under the SDK root recorded in the registry.
    Registry,
    /// Found at one of the standard install paths.
    WellKnownPath,
    /// Found by walking `WindowsSdkDir`.
    SdkDirectory,
    /// Not found; the bare program name is left to the process search path.
    SearchPath,
}

impl fmt::Display for ToolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Registry => "registry",
            Self::WellKnownPath => "well-known path",
            Self::SdkDirectory => SDK_DIR_ENV,
            Self::SearchPath => "search path",
        };
        f.write_str(label)
    }
}

/// A resolved executable and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocation {
    /// Program to run: an absolute path, or the bare file name for
    /// [`ToolSource::SearchPath`].
    pub program: Utf8PathBuf,
    /// Tier that produced `program`.
    pub source: ToolSource,
}

impl ToolLocation {
    fn new(program: Utf8PathBuf, source: ToolSource) -> Self {
        debug!("resolved {program} via {source}");
        Self { program, source }
    }
}

/// Resolves `tool` through the four search tiers.
///
/// Always returns a location: when every tier misses, the bare program name
/// is returned and any failure surfaces when it is run.
///
/// # Examples
///
/// ```
/// use model_packager::kit::search::{SearchConfig, ToolSource, resolve_tool};
/// use model_packager::kit::{FixedKitLocator, InstalledKit, Tool};
///
/// let locator = FixedKitLocator(InstalledKit::new("/nonexistent/kits", Vec::new()));
/// let config = SearchConfig { well_known_dirs: Vec::new(), sdk_dir: None };
/// let location = resolve_tool(Tool::MakeAppx, &locator, &config);
/// assert_eq!(location.source, ToolSource::SearchPath);
/// assert_eq!(location.program, "makeappx.exe");
/// ```
pub fn resolve_tool(tool: Tool, locator: &dyn KitLocator, config: &SearchConfig) -> ToolLocation {
    match locator.installed_kit() {
        Ok(kit) => {
            if let Some(program) = first_existing(kit.candidates(tool)) {
                return ToolLocation::new(program, ToolSource::Registry);
            }
        }
        Err(e) => {
            debug!("SDK registry lookup failed: {e}; probing well-known paths");
            let candidates = config
                .well_known_dirs
                .iter()
                .map(|dir| dir.join(tool.file_name()));
            if let Some(program) = first_existing(candidates) {
                return ToolLocation::new(program, ToolSource::WellKnownPath);
            }
        }
    }

    if let Some(program) = config
        .sdk_dir
        .as_deref()
        .and_then(|root| search_sdk_dir(root, tool))
    {
        return ToolLocation::new(program, ToolSource::SdkDirectory);
    }

    ToolLocation::new(Utf8PathBuf::from(tool.file_name()), ToolSource::SearchPath)
}

fn first_existing(candidates: impl IntoIterator<Item = Utf8PathBuf>) -> Option<Utf8PathBuf> {
    candidates.into_iter().find(|candidate| {
        let found = candidate.is_file();
        if !found {
            trace!("no tool at {candidate}");
        }
        found
    })
}

/// Walks `root` for `x64` directories holding `tool`.
///
/// Entries are visited in file-name order and the first match wins.
#[must_use]
pub fn search_sdk_dir(root: &Utf8Path, tool: Tool) -> Option<Utf8PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir() && entry.file_name() == ARCH_DIR)
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.into_path()).ok())
        .map(|dir| dir.join(tool.file_name()))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackagerError;
    use crate::kit::{InstalledKit, KitVersion, MockKitLocator};
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    struct Kits {
        _temp: TempDir,
        root: Utf8PathBuf,
    }

    impl Kits {
        fn install(&self, relative: &str) -> Utf8PathBuf {
            let path = self.root.join(relative);
            fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
            fs::write(&path, b"MZ").expect("write tool");
            path
        }

        fn kit(&self, versions: &[&str]) -> InstalledKit {
            let versions = versions
                .iter()
                .map(|raw| KitVersion::parse(raw).expect("valid version"))
                .collect();
            InstalledKit::new(self.root.clone(), versions)
        }
    }

    #[fixture]
    fn kits() -> Kits {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("utf-8 temp path");
        Kits { _temp: temp, root }
    }

    fn locator_returning(kit: InstalledKit) -> MockKitLocator {
        let mut locator = MockKitLocator::new();
        locator
            .expect_installed_kit()
            .times(1)
            .return_once(move || Ok(kit));
        locator
    }

    fn failing_locator() -> MockKitLocator {
        let mut locator = MockKitLocator::new();
        locator.expect_installed_kit().times(1).returning(|| {
            Err(PackagerError::RegistryQuery {
                reason: "key not found".to_owned(),
            })
        });
        locator
    }

    fn empty_config() -> SearchConfig {
        SearchConfig {
            well_known_dirs: Vec::new(),
            sdk_dir: None,
        }
    }

    #[rstest]
    fn registry_prefers_newest_version(kits: Kits) {
        kits.install("bin/10.0.19041.0/x64/makeappx.exe");
        let newest = kits.install("bin/10.0.22621.0/x64/makeappx.exe");
        kits.install("bin/x64/makeappx.exe");
        let locator =
            locator_returning(kits.kit(&["10.0.19041.0", "10.0.22621.0", "10.0.17763.0"]));

        let location = resolve_tool(Tool::MakeAppx, &locator, &empty_config());

        assert_eq!(location.program, newest);
        assert_eq!(location.source, ToolSource::Registry);
    }

    #[rstest]
    fn registry_falls_back_to_unversioned_bin(kits: Kits) {
        let unversioned = kits.install("bin/x64/signtool.exe");
        let locator = locator_returning(kits.kit(&["10.0.22621.0"]));

        let location = resolve_tool(Tool::SignTool, &locator, &empty_config());

        assert_eq!(location.program, unversioned);
        assert_eq!(location.source, ToolSource::Registry);
    }

    #[rstest]
    fn well_known_paths_used_when_registry_fails(kits: Kits) {
        let tool = kits.install("bin/10.0.19041.0/x64/makeappx.exe");
        let config = SearchConfig {
            well_known_dirs: vec![
                kits.root.join("bin/10.0.22621.0/x64"),
                kits.root.join("bin/10.0.19041.0/x64"),
                kits.root.join("bin/x64"),
            ],
            sdk_dir: None,
        };

        let location = resolve_tool(Tool::MakeAppx, &failing_locator(), &config);

        assert_eq!(location.program, tool);
        assert_eq!(location.source, ToolSource::WellKnownPath);
    }

    #[rstest]
    fn well_known_paths_skipped_when_registry_succeeds(kits: Kits) {
        kits.install("well-known/x64/makeappx.exe");
        let config = SearchConfig {
            well_known_dirs: vec![kits.root.join("well-known/x64")],
            sdk_dir: None,
        };
        let locator = locator_returning(InstalledKit::new(kits.root.join("empty-kit"), Vec::new()));

        let location = resolve_tool(Tool::MakeAppx, &locator, &config);

        assert_eq!(location.source, ToolSource::SearchPath);
    }

    #[rstest]
    fn sdk_directory_searched_recursively(kits: Kits) {
        let tool = kits.install("sdk/bin/10.0.22000.0/x64/makeappx.exe");
        kits.install("sdk/bin/10.0.22000.0/arm64/makeappx.exe");
        let config = SearchConfig {
            well_known_dirs: Vec::new(),
            sdk_dir: Some(kits.root.join("sdk")),
        };

        let location = resolve_tool(Tool::MakeAppx, &failing_locator(), &config);

        assert_eq!(location.program, tool);
        assert_eq!(location.source, ToolSource::SdkDirectory);
    }

    #[rstest]
    fn sdk_directory_ignores_tools_outside_x64(kits: Kits) {
        kits.install("sdk/bin/arm64/makeappx.exe");
        kits.install("sdk/bin/makeappx.exe");

        assert_eq!(search_sdk_dir(&kits.root.join("sdk"), Tool::MakeAppx), None);
    }

    #[test]
    fn falls_back_to_bare_program_name() {
        let config = SearchConfig {
            well_known_dirs: Vec::new(),
            sdk_dir: Some(Utf8PathBuf::from("/definitely/not/an/sdk")),
        };

        let location = resolve_tool(Tool::MakeAppx, &failing_locator(), &config);

        assert_eq!(location.program, Utf8PathBuf::from("makeappx.exe"));
        assert_eq!(location.source, ToolSource::SearchPath);
    }

    #[test]
    fn from_env_reads_sdk_dir() {
        temp_env::with_var(SDK_DIR_ENV, Some(r"D:\Kits\10"), || {
            let config = SearchConfig::from_env();
            assert_eq!(config.sdk_dir, Some(Utf8PathBuf::from(r"D:\Kits\10")));
            assert_eq!(config.well_known_dirs, SearchConfig::default_well_known_dirs());
        });
    }

    #[rstest]
    #[case::unset(None)]
    #[case::blank(Some("  "))]
    fn from_env_ignores_missing_sdk_dir(#[case] value: Option<&str>) {
        temp_env::with_var(SDK_DIR_ENV, value, || {
            assert_eq!(SearchConfig::from_env().sdk_dir, None);
        });
    }

    #[test]
    fn default_well_known_dirs_are_newest_first() {
        let dirs = SearchConfig::default_well_known_dirs();
        assert_eq!(dirs.len(), WELL_KNOWN_VERSIONS.len() + 1);
        assert!(dirs[0].as_str().contains("10.0.22621.0"));
        assert!(dirs[3].as_str().contains("10.0.17763.0"));
        assert!(dirs[4].as_str().ends_with(ARCH_DIR));
    }

    #[test]
    fn tool_source_serializes_in_kebab_case() {
        let json = serde_json::to_string(&ToolSource::WellKnownPath).expect("serialize");
        assert_eq!(json, "\"well-known-path\"");
    }
}
