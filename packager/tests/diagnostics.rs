//! Log diagnostics emitted by failed and signed packaging runs.
//!
//! The logger is process-global, so every assertion lives in a single test.

use camino::Utf8PathBuf;
use logtest::Logger;
use model_packager::invoke::{SdkTools, invoke_packager};
use model_packager::kit::search::SearchConfig;
use model_packager::kit::{FixedKitLocator, InstalledKit};
use model_packager::platform::Platform;
use model_packager::signing::{SigningOptions, sign_package};
use model_packager::test_utils::{ExpectedCall, StubExecutor, failure_output, success_output};
use tempfile::TempDir;

fn drain(logger: &mut Logger) -> Vec<String> {
    let mut messages = Vec::new();
    while let Some(record) = logger.pop() {
        messages.push(record.args().to_string());
    }
    messages
}

#[test]
fn failures_are_logged_with_tool_output_and_passwords_are_hidden() {
    let mut logger = Logger::start();
    let temp = TempDir::new().expect("failed to create temp dir");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp path not UTF-8");
    let locator = FixedKitLocator(InstalledKit::new(root.join("no-sdk"), Vec::new()));
    let search = SearchConfig {
        well_known_dirs: Vec::new(),
        sdk_dir: None,
    };

    let executor = StubExecutor::new(vec![ExpectedCall::new(
        "makeappx.exe",
        Ok(failure_output("disk full")),
    )]);
    let tools = SdkTools::new(&executor, &locator, search.clone());
    let result = invoke_packager(Platform::Windows, &tools, &root, &root.join("model.msix"));

    assert_eq!(result, None);
    let messages = drain(&mut logger);
    assert!(
        messages.iter().any(|message| message.contains("disk full")),
        "expected the tool's stderr in the logs, got {messages:?}"
    );

    let executor = StubExecutor::new(vec![ExpectedCall::new(
        "signtool.exe",
        Ok(success_output()),
    )]);
    let tools = SdkTools::new(&executor, &locator, search);
    let options = SigningOptions::new(root.join("cert.pfx")).with_password("hunter2");
    sign_package(&tools, &root.join("model.msix"), &options).expect("signing succeeds");

    let messages = drain(&mut logger);
    assert!(messages.iter().any(|message| message.contains("signtool.exe sign")));
    assert!(
        messages.iter().all(|message| !message.contains("hunter2")),
        "password leaked into logs: {messages:?}"
    );
    assert_eq!(executor.calls()[0].flag_value("/p"), Some("hunter2"));
}
