//! Package identity names.
//!
//! Package and publisher names are embedded in generated XML and in file
//! names, so they are reduced to alphanumeric characters first.

use crate::error::{PackagerError, Result};
use std::fmt;

/// Suffix appended to the package name to form the identity name.
const IDENTITY_SUFFIX: &str = "ModelPackage";

/// Strips every character that is not alphanumeric.
///
/// There is no Unicode normalization and no length limit, and the function is
/// idempotent.
///
/// # Examples
///
/// ```
/// use model_packager::names::sanitize_name;
///
/// assert_eq!(sanitize_name("My Repo!"), "MyRepo");
/// assert_eq!(sanitize_name(&sanitize_name("gpt-2.onnx")), "gpt2onnx");
/// ```
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    raw.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// A sanitized package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName(String);

/// A sanitized publisher name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublisherName(String);

macro_rules! sanitized_name {
    ($ty:ident) => {
        impl $ty {
            /// Sanitizes `raw` into a name.
            #[must_use]
            pub fn new(raw: &str) -> Self {
                Self(sanitize_name(raw))
            }

            /// Get the name as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true when sanitization removed every character.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

sanitized_name!(PackageName);
sanitized_name!(PublisherName);

/// The sanitized names that identify a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    package: PackageName,
    publisher: PublisherName,
}

impl PackageIdentity {
    /// Sanitizes both names without validating them.
    #[must_use]
    pub fn new(package: &str, publisher: &str) -> Self {
        Self {
            package: PackageName::new(package),
            publisher: PublisherName::new(publisher),
        }
    }

    /// Sanitizes both names and rejects any that end up empty.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidName`] naming the first empty field.
    pub fn validated(package: &str, publisher: &str) -> Result<Self> {
        let identity = Self::new(package, publisher);
        if identity.package.is_empty() {
            return Err(PackagerError::InvalidName {
                field: "package",
                value: package.to_owned(),
            });
        }
        if identity.publisher.is_empty() {
            return Err(PackagerError::InvalidName {
                field: "publisher",
                value: publisher.to_owned(),
            });
        }
        Ok(identity)
    }

    /// The sanitized package name.
    #[must_use]
    pub fn package(&self) -> &PackageName {
        &self.package
    }

    /// The sanitized publisher name.
    #[must_use]
    pub fn publisher(&self) -> &PublisherName {
        &self.publisher
    }

    /// The `Identity/@Name` value, `<package>ModelPackage`.
    #[must_use]
    pub fn identity_name(&self) -> String {
        format!("{}{IDENTITY_SUFFIX}", self.package)
    }

    /// The `Identity/@Publisher` value, `CN=<publisher>`.
    #[must_use]
    pub fn publisher_subject(&self) -> String {
        format!("CN={}", self.publisher)
    }

    /// Default archive file name, `<publisher>_<package>.msix`.
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        format!("{}_{}.msix", self.publisher, self.package)
    }
}
