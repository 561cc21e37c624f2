//! Staging directory lifecycle and model file copying.
//!
//! The staging directory holds everything `makeappx` packs. When the caller
//! does not name one, a fresh temporary directory is acquired and removed on
//! release, whichever way the packaging run ends.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace, warn};
use std::fs::{self, File, FileTimes};
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Prefix of temporary staging directories.
const TEMP_PREFIX: &str = "model-packager-";

/// A directory the model files are staged into.
#[derive(Debug)]
pub enum StagingDir {
    /// A temporary directory removed when released or dropped.
    Owned {
        /// Handle that deletes the directory on drop.
        temp: TempDir,
        /// UTF-8 view of the temporary path.
        path: Utf8PathBuf,
    },
    /// A caller-supplied directory that is never removed.
    Provided(Utf8PathBuf),
}

impl StagingDir {
    /// Acquires a staging directory.
    ///
    /// With `requested` set, that directory is created if missing and reused
    /// as-is. Otherwise a new temporary directory is created.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::StagingFailed`] if the directory cannot be
    /// created or the temporary path is not valid UTF-8.
    pub fn acquire(requested: Option<&Utf8Path>) -> Result<Self> {
        match requested {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| PackagerError::StagingFailed {
                    reason: format!("failed to create {dir}: {e}"),
                })?;
                debug!("using staging directory {dir}");
                Ok(Self::Provided(dir.to_owned()))
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix(TEMP_PREFIX)
                    .tempdir()
                    .map_err(|e| PackagerError::StagingFailed {
                        reason: format!("failed to create temporary directory: {e}"),
                    })?;
                let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).map_err(|e| {
                    PackagerError::StagingFailed {
                        reason: format!("temporary directory is not valid UTF-8: {e}"),
                    }
                })?;
                debug!("created temporary staging directory {path}");
                Ok(Self::Owned { temp, path })
            }
        }
    }

    /// Return the full path to the staging directory.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Owned { path, .. } => path,
            Self::Provided(path) => path,
        }
    }

    /// Returns true if the directory is removed on release.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned { .. })
    }

    /// Copies every file under `source` into the staging directory.
    ///
    /// Returns the number of files copied.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::StagingFailed`] if the source tree cannot be
    /// walked or a file cannot be copied.
    pub fn populate_from(&self, source: &Utf8Path) -> Result<usize> {
        copy_tree(source, self.path())
    }

    /// Releases the directory, deleting it if it is owned.
    ///
    /// Removal failures are logged rather than returned so that release never
    /// masks the outcome of the packaging run.
    pub fn release(self) {
        match self {
            Self::Owned { temp, path } => match temp.close() {
                Ok(()) => debug!("removed staging directory {path}"),
                Err(e) => warn!("failed to remove staging directory {path}: {e}"),
            },
            Self::Provided(path) => debug!("leaving staging directory {path} in place"),
        }
    }
}

/// Recursively copies every file under `source` into `dest`.
///
/// Relative paths are preserved and parent directories created as needed.
/// Permissions and timestamps are carried over where the platform allows.
/// Directories with no files are not recreated. Returns the number of files
/// copied.
///
/// # Errors
///
/// Returns [`PackagerError::StagingFailed`] if the walk or any copy fails.
pub fn copy_tree(source: &Utf8Path, dest: &Utf8Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| PackagerError::StagingFailed {
            reason: format!("failed to read {source}: {e}"),
        })?;
        let from = entry.path();
        if !from.is_file() {
            continue;
        }

        let relative = from
            .strip_prefix(source)
            .map_err(|e| PackagerError::StagingFailed {
                reason: format!("{} is outside {source}: {e}", from.display()),
            })?;
        let to = dest.as_std_path().join(relative);
        copy_file(from, &to)?;
        debug!("copied {} to {}", from.display(), to.display());
        copied += 1;
    }

    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let to_error = |e: std::io::Error| PackagerError::StagingFailed {
        reason: format!("failed to copy {} to {}: {e}", from.display(), to.display()),
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::copy(from, to).map_err(to_error)?;
    preserve_times(from, to);
    Ok(())
}

fn preserve_times(from: &Path, to: &Path) {
    let result = fs::metadata(from).and_then(|metadata| {
        let mut times = FileTimes::new().set_modified(metadata.modified()?);
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }
        File::options().write(true).open(to)?.set_times(times)
    });

    if let Err(e) = result {
        trace!("could not preserve timestamps on {}: {e}", to.display());
    }
}
