//! Host platform detection.
//!
//! Only Windows ships the SDK tools, so packaging stops early everywhere else.

use crate::error::{PackagerError, Result};

/// The operating system a packaging run executes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Microsoft Windows, where packaging is supported.
    Windows,
    /// Any other operating system, named as in [`std::env::consts::OS`].
    Other(&'static str),
}

impl Platform {
    /// Detects the platform the binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Other(std::env::consts::OS)
        }
    }

    /// Returns true if packaging can run on this platform.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Fails unless packaging can run on this platform.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::UnsupportedPlatform`] on non-Windows hosts.
    pub fn ensure_supported(self) -> Result<()> {
        match self {
            Self::Windows => Ok(()),
            Self::Other(os) => Err(PackagerError::UnsupportedPlatform { os: os.to_owned() }),
        }
    }
}
