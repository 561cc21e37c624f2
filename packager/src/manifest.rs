//! `AppxManifest.xml` generation.
//!
//! The manifest is a fixed template with the sanitized package and publisher
//! names substituted in. Names are already alphanumeric, so no XML escaping is
//! needed.

use crate::error::{PackagerError, Result};
use crate::names::PackageIdentity;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// File name of the generated manifest.
pub const MANIFEST_FILE_NAME: &str = "AppxManifest.xml";

/// Package version written into every manifest.
pub const PACKAGE_VERSION: &str = "1.0.0.0";

/// Renders the manifest text for `identity`.
///
/// # Examples
///
/// ```
/// use model_packager::manifest::render_manifest;
/// use model_packager::names::PackageIdentity;
///
/// let xml = render_manifest(&PackageIdentity::new("phi-3", "Contoso Ltd"));
/// assert!(xml.contains(r#"Name="phi3ModelPackage""#));
/// assert!(xml.contains(r#"Publisher="CN=ContosoLtd""#));
/// ```
#[must_use]
pub fn render_manifest(identity: &PackageIdentity) -> String {
    let package = identity.package();
    let publisher = identity.publisher();
    let identity_name = identity.identity_name();
    let publisher_subject = identity.publisher_subject();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<Package
  xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10"
  xmlns:uap="http://schemas.microsoft.com/appx/manifest/uap/windows10"
  IgnorableNamespaces="uap">

  <Identity
    Name="{identity_name}"
    Publisher="{publisher_subject}"
    Version="{PACKAGE_VERSION}" />

  <Properties>
    <DisplayName>{package} Model Package</DisplayName>
    <PublisherDisplayName>{publisher}</PublisherDisplayName>
    <Logo>Images\StoreLogo.png</Logo>
    <Framework>true</Framework>
  </Properties>

  <Dependencies>
    <TargetDeviceFamily Name="Windows.Desktop" MinVersion="10.0.17763.0" MaxVersionTested="10.0.22621.0" />
  </Dependencies>

  <Resources>
    <Resource Language="en-us" />
  </Resources>
</Package>"#
    )
}

/// Writes `AppxManifest.xml` into `output_dir` and returns its path.
///
/// The directory and its parents are created when missing. Empty sanitized
/// names are written as-is; use [`PackageIdentity::validated`] to reject them
/// before calling this.
///
/// # Errors
///
/// Returns [`PackagerError::ManifestWrite`] if the directory cannot be created
/// or the file cannot be written.
pub fn write_manifest(output_dir: &Utf8Path, identity: &PackageIdentity) -> Result<Utf8PathBuf> {
    let path = output_dir.join(MANIFEST_FILE_NAME);
    let to_error = |source| PackagerError::ManifestWrite {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(output_dir).map_err(to_error)?;
    fs::write(&path, render_manifest(identity)).map_err(to_error)?;

    debug!("wrote manifest for {} to {path}", identity.identity_name());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_temp_dir() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("utf-8 temp path");
        (temp, path)
    }

    #[test]
    fn manifest_embeds_sanitized_names_twice_each() {
        let xml = render_manifest(&PackageIdentity::new("My Repo!", "Some Org"));

        assert!(xml.contains(r#"Name="MyRepoModelPackage""#));
        assert!(xml.contains(r#"Publisher="CN=SomeOrg""#));
        assert!(xml.contains("<DisplayName>MyRepo Model Package</DisplayName>"));
        assert!(xml.contains("<PublisherDisplayName>SomeOrg</PublisherDisplayName>"));
        assert!(!xml.contains("My Repo!"));
    }

    #[test]
    fn manifest_carries_fixed_fields() {
        let xml = render_manifest(&PackageIdentity::new("Olive", "Microsoft"));

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains(r#"Version="1.0.0.0""#));
        assert!(xml.contains(r"<Logo>Images\StoreLogo.png</Logo>"));
        assert!(xml.contains(r#"MinVersion="10.0.17763.0""#));
        assert!(xml.contains(r#"MaxVersionTested="10.0.22621.0""#));
        assert!(xml.contains(r#"<Resource Language="en-us" />"#));
        assert!(xml.trim_end().ends_with("</Package>"));
    }

    #[test]
    fn manifest_is_deterministic() {
        let identity = PackageIdentity::new("phi3", "Contoso");
        assert_eq!(render_manifest(&identity), render_manifest(&identity));
    }

    #[test]
    fn write_manifest_creates_missing_parents() {
        let (_temp, root) = utf8_temp_dir();
        let output_dir = root.join("nested").join("stage");

        let path = write_manifest(&output_dir, &PackageIdentity::new("Olive", "Microsoft"))
            .expect("manifest should be written");

        assert_eq!(path, output_dir.join("AppxManifest.xml"));
        let contents = fs::read_to_string(&path).expect("read manifest");
        assert!(contents.contains("OliveModelPackage"));
    }

    #[test]
    fn write_manifest_accepts_degenerate_names() {
        let (_temp, root) = utf8_temp_dir();

        let path = write_manifest(&root, &PackageIdentity::new("", "***"))
            .expect("empty names still produce a manifest");

        let contents = fs::read_to_string(path).expect("read manifest");
        assert!(contents.contains(r#"Name="ModelPackage""#));
        assert!(contents.contains(r#"Publisher="CN=""#));
    }

    #[test]
    fn write_manifest_overwrites_existing_file() {
        let (_temp, root) = utf8_temp_dir();
        fs::write(root.join(MANIFEST_FILE_NAME), "stale").expect("seed manifest");

        write_manifest(&root, &PackageIdentity::new("fresh", "Contoso")).expect("write");

        let contents = fs::read_to_string(root.join(MANIFEST_FILE_NAME)).expect("read");
        assert!(contents.contains("freshModelPackage"));
    }
}
