//! Authenticode signing of finished packages with `signtool.exe`.

use crate::error::{PackagerError, Result};
use crate::invoke::SdkTools;
use crate::kit::Tool;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

/// Digest algorithm passed to `signtool sign /fd`.
pub const FILE_DIGEST: &str = "SHA256";

/// Certificate used to sign a package.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningOptions {
    certificate: Utf8PathBuf,
    password: Option<String>,
}

impl SigningOptions {
    /// Signs with the PFX file at `certificate`.
    #[must_use]
    pub fn new(certificate: impl Into<Utf8PathBuf>) -> Self {
        Self {
            certificate: certificate.into(),
            password: None,
        }
    }

    /// Sets the password protecting the certificate.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Path of the certificate file.
    #[must_use]
    pub fn certificate(&self) -> &Utf8Path {
        &self.certificate
    }

    /// Fails if the certificate file is missing.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::CertificateNotFound`] when the path is not a
    /// file.
    pub fn ensure_certificate_exists(&self) -> Result<()> {
        if self.certificate.is_file() {
            Ok(())
        } else {
            Err(PackagerError::CertificateNotFound {
                path: self.certificate.clone(),
            })
        }
    }

    /// Arguments for `signtool.exe` signing `package`.
    #[must_use]
    pub fn sign_args<'a>(&'a self, package: &'a Utf8Path) -> Vec<&'a str> {
        let mut args = vec!["sign", "/fd", FILE_DIGEST];
        if let Some(password) = &self.password {
            args.extend(["/p", password.as_str()]);
        }
        args.extend(["/f", self.certificate.as_str(), package.as_str()]);
        args
    }
}

impl std::fmt::Debug for SigningOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningOptions")
            .field("certificate", &self.certificate)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Signs `package` in place.
///
/// # Errors
///
/// Returns an error if `signtool.exe` cannot be started or exits non-zero.
pub fn sign_package(tools: &SdkTools<'_>, package: &Utf8Path, options: &SigningOptions) -> Result<()> {
    info!("signing {package} with {}", options.certificate);
    tools.run_redacted(
        Tool::SignTool,
        &options.sign_args(package),
        options.password.as_deref(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::MockKitLocator;
    use crate::kit::search::SearchConfig;
    use crate::test_utils::{ExpectedCall, StubExecutor, failure_output, success_output};
    use rstest::rstest;

    fn tools<'a>(executor: &'a StubExecutor, locator: &'a MockKitLocator) -> SdkTools<'a> {
        SdkTools::new(
            executor,
            locator,
            SearchConfig {
                well_known_dirs: Vec::new(),
                sdk_dir: None,
            },
        )
    }

    fn no_registry() -> MockKitLocator {
        let mut locator = MockKitLocator::new();
        locator.expect_installed_kit().returning(|| {
            Err(PackagerError::RegistryQuery {
                reason: "unavailable".to_owned(),
            })
        });
        locator
    }

    #[rstest]
    #[case::without_password(None, vec!["sign", "/fd", "SHA256", "/f", "cert.pfx", "out.msix"])]
    #[case::with_password(
        Some("s3cret"),
        vec!["sign", "/fd", "SHA256", "/p", "s3cret", "/f", "cert.pfx", "out.msix"]
    )]
    fn sign_args_follow_signtool_layout(#[case] password: Option<&str>, #[case] expected: Vec<&str>) {
        let mut options = SigningOptions::new("cert.pfx");
        if let Some(password) = password {
            options = options.with_password(password);
        }
        assert_eq!(options.sign_args(Utf8Path::new("out.msix")), expected);
    }

    #[test]
    fn debug_output_hides_password() {
        let options = SigningOptions::new("cert.pfx").with_password("s3cret");
        let rendered = format!("{options:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("cert.pfx"));
    }

    #[test]
    fn missing_certificate_is_reported() {
        let err = SigningOptions::new("/definitely/missing.pfx")
            .ensure_certificate_exists()
            .expect_err("certificate is absent");
        assert!(matches!(err, PackagerError::CertificateNotFound { .. }));
    }

    #[test]
    fn sign_package_runs_signtool() {
        let executor = StubExecutor::new(vec![ExpectedCall::new(
            "signtool.exe",
            Ok(success_output()),
        )]);
        let locator = no_registry();

        sign_package(
            &tools(&executor, &locator),
            Utf8Path::new("out.msix"),
            &SigningOptions::new("cert.pfx"),
        )
        .expect("signing succeeds");

        let calls = executor.calls();
        assert_eq!(calls[0].args.first().map(String::as_str), Some("sign"));
        assert_eq!(calls[0].flag_value("/f"), Some("cert.pfx"));
        executor.assert_finished();
    }

    #[test]
    fn signtool_failure_is_an_error() {
        let executor = StubExecutor::new(vec![ExpectedCall::new(
            "signtool.exe",
            Ok(failure_output("SignTool Error: No certificates were found")),
        )]);
        let locator = no_registry();

        let err = sign_package(
            &tools(&executor, &locator),
            Utf8Path::new("out.msix"),
            &SigningOptions::new("cert.pfx"),
        )
        .expect_err("signing fails");

        assert!(err.to_string().contains("No certificates were found"));
    }
}
