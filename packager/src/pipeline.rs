//! End-to-end packaging orchestration.
//!
//! A packaging run validates its inputs, stages the model files, writes the
//! manifest and placeholder images, packs the staging directory, and
//! optionally signs the result. The staging directory is released whichever
//! way the run ends, and an archive that fails signing is deleted.

use crate::assets::write_placeholder_images;
use crate::error::{PackagerError, Result};
use crate::executor::CommandExecutor;
use crate::invoke::{SdkTools, try_invoke_packager};
use crate::kit::KitLocator;
use crate::kit::search::SearchConfig;
use crate::manifest::write_manifest;
use crate::names::PackageIdentity;
use crate::platform::Platform;
use crate::signing::{SigningOptions, sign_package};
use crate::staging::StagingDir;
use camino::{Utf8Path, Utf8PathBuf};
use log::{error, info, warn};
use std::fs;
use std::io::ErrorKind;

/// Everything needed for one packaging run.
#[derive(Debug, Clone)]
pub struct PackageRequest {
    /// Directory holding the model files.
    pub model_dir: Utf8PathBuf,
    /// Path of the archive to produce.
    pub output: Utf8PathBuf,
    /// Sanitized package and publisher names.
    pub identity: PackageIdentity,
    /// Persistent staging directory; a temporary one is used when `None`.
    pub staging_dir: Option<Utf8PathBuf>,
    /// Certificate to sign the archive with, if any.
    pub signing: Option<SigningOptions>,
}

impl PackageRequest {
    /// Creates a request using a temporary staging directory and no signing.
    #[must_use]
    pub fn new(
        model_dir: impl Into<Utf8PathBuf>,
        output: impl Into<Utf8PathBuf>,
        identity: PackageIdentity,
    ) -> Self {
        Self {
            model_dir: model_dir.into(),
            output: output.into(),
            identity,
            staging_dir: None,
            signing: None,
        }
    }

    /// Stages into `dir` and keeps it afterwards.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Signs the archive once it is packed.
    #[must_use]
    pub fn with_signing(mut self, signing: SigningOptions) -> Self {
        self.signing = Some(signing);
        self
    }
}

/// Runs packaging requests against a command executor and SDK locator.
pub struct Packager<'a> {
    executor: &'a dyn CommandExecutor,
    locator: &'a dyn KitLocator,
    search: SearchConfig,
    platform: Platform,
}

impl<'a> Packager<'a> {
    /// Creates a packager for the current platform, reading the search
    /// configuration from the environment.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, locator: &'a dyn KitLocator) -> Self {
        Self {
            executor,
            locator,
            search: SearchConfig::from_env(),
            platform: Platform::current(),
        }
    }

    /// Overrides the detected platform.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Overrides the non-registry search configuration.
    #[must_use]
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// The SDK tool runner this packager uses.
    #[must_use]
    pub fn tools(&self) -> SdkTools<'a> {
        SdkTools::new(self.executor, self.locator, self.search.clone())
    }

    /// Packages `request`, returning the archive path.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform is unsupported, the inputs are
    /// invalid, staging or manifest writing fails, or an SDK tool fails.
    pub fn try_create_package(&self, request: &PackageRequest) -> Result<Utf8PathBuf> {
        self.platform.ensure_supported()?;
        validate_model_dir(&request.model_dir)?;
        if let Some(signing) = &request.signing {
            signing.ensure_certificate_exists()?;
        }

        let staging = StagingDir::acquire(request.staging_dir.as_deref())?;
        let result = self.package_from(&staging, request);
        staging.release();
        result
    }

    /// Packages `request`, logging the failure and returning `None` on error.
    #[must_use]
    pub fn create_package(&self, request: &PackageRequest) -> Option<Utf8PathBuf> {
        match self.try_create_package(request) {
            Ok(path) => Some(path),
            Err(e) => {
                error!("packaging {} failed: {e}", request.model_dir);
                None
            }
        }
    }

    fn package_from(&self, staging: &StagingDir, request: &PackageRequest) -> Result<Utf8PathBuf> {
        let staging_path = staging.path();
        let copied = staging.populate_from(&request.model_dir)?;
        info!("staged {copied} model file(s) in {staging_path}");

        write_manifest(staging_path, &request.identity)?;
        write_placeholder_images(staging_path);

        let tools = self.tools();
        let archive = try_invoke_packager(&tools, staging_path, &request.output)?;
        if let Some(signing) = &request.signing {
            sign_package(&tools, &archive, signing).inspect_err(|_| discard_unsigned(&archive))?;
        }
        Ok(archive)
    }
}

fn discard_unsigned(archive: &Utf8Path) {
    if let Err(e) = fs::remove_file(archive) {
        warn!("could not remove unsigned package {archive}: {e}");
    }
}

/// Checks that `model_dir` exists and is a directory.
///
/// # Errors
///
/// Returns [`PackagerError::SourceNotFound`] or
/// [`PackagerError::SourceNotDirectory`], or an I/O error if the path cannot
/// be inspected.
pub fn validate_model_dir(model_dir: &Utf8Path) -> Result<()> {
    match fs::metadata(model_dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PackagerError::SourceNotDirectory {
            path: model_dir.to_owned(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(PackagerError::SourceNotFound {
            path: model_dir.to_owned(),
        }),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
